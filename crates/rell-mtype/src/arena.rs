// arena.rs
//
// Interned structural types using TypeId handles for O(1) equality.
//
// - MType: the canonical type representation, children referenced by TypeId
// - TypeArena: per-session storage with normalization and deduplication, plus the
//   tables of generic type definitions and type parameters the types refer to

use rell_identity::{GenericTypeId, Name, TypeParamId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::ModelError;
use crate::generic::{ConversionDecl, GenericParent, GenericTypeDef, TypeParamDef, Variance};
use crate::type_id::{TypeId, TypeIdVec};
use crate::typeset::{TypeSet, TypeSetVec};

/// Canonical type representation.
///
/// Only ever constructed through `TypeArena`, which normalizes nullable forms and
/// generic arguments before interning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MType {
    Error,
    Unit,
    Anything,
    Any,
    Nothing,
    Null,
    /// Instantiation of a generic type definition. Simple types have no args.
    Generic {
        def: GenericTypeId,
        args: TypeSetVec,
    },
    Param(TypeParamId),
    Nullable(TypeId),
    Function {
        params: TypeIdVec,
        result: TypeId,
    },
}

pub struct TypeArena {
    /// Interned types, indexed by TypeId
    types: Vec<MType>,
    intern_map: FxHashMap<MType, TypeId>,
    generics: Vec<GenericTypeDef>,
    params: Vec<TypeParamDef>,
    generic_names: FxHashMap<Name, GenericTypeId>,
    /// Direct supertype of each interned generic instantiation that has one
    parents: FxHashMap<TypeId, TypeId>,
}

impl std::fmt::Debug for TypeArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeArena")
            .field("types_count", &self.types.len())
            .field("generics_count", &self.generics.len())
            .finish_non_exhaustive()
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Create a new TypeArena with the built-in types pre-interned
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: FxHashMap::default(),
            generics: Vec::new(),
            params: Vec::new(),
            generic_names: FxHashMap::default(),
            parents: FxHashMap::default(),
        };

        // Interned in the order of the TypeId constants.
        let error = arena.intern(MType::Error);
        debug_assert_eq!(error, TypeId::ERROR);
        let unit = arena.intern(MType::Unit);
        debug_assert_eq!(unit, TypeId::UNIT);
        let anything = arena.intern(MType::Anything);
        debug_assert_eq!(anything, TypeId::ANYTHING);
        let any = arena.intern(MType::Any);
        debug_assert_eq!(any, TypeId::ANY);
        let nothing = arena.intern(MType::Nothing);
        debug_assert_eq!(nothing, TypeId::NOTHING);
        let null = arena.intern(MType::Null);
        debug_assert_eq!(null, TypeId::NULL);
        debug_assert_eq!(arena.types.len() as u32, TypeId::FIRST_DYNAMIC);

        arena
    }

    fn intern(&mut self, ty: MType) -> TypeId {
        let next_id = TypeId::from_raw(self.types.len() as u32);
        *self.intern_map.entry(ty.clone()).or_insert_with(|| {
            self.types.push(ty);
            next_id
        })
    }

    /// Like `intern`, also reporting whether the type was new.
    fn intern_fresh(&mut self, ty: MType) -> (TypeId, bool) {
        let before = self.types.len();
        let id = self.intern(ty);
        (id, self.types.len() > before)
    }

    pub fn get(&self, id: TypeId) -> &MType {
        &self.types[id.index() as usize]
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    pub fn define_type_param(
        &mut self,
        name: impl Into<Name>,
        variance: Variance,
        bounds: TypeSet,
    ) -> TypeParamId {
        let id = TypeParamId::new(self.params.len() as u32);
        self.params.push(TypeParamDef {
            name: name.into(),
            variance,
            bounds,
        });
        id
    }

    pub fn type_param(&self, id: TypeParamId) -> &TypeParamDef {
        &self.params[id.index() as usize]
    }

    /// Define a generic type constructor. Names are not required to be unique; the
    /// latest definition wins for `find_generic`.
    pub fn define_generic(&mut self, name: impl Into<Name>, params: &[TypeParamId]) -> GenericTypeId {
        let name = name.into();
        let id = GenericTypeId::new(self.generics.len() as u32);
        self.generics.push(GenericTypeDef {
            name: name.clone(),
            params: params.iter().copied().collect(),
            parent: None,
            conversions: Vec::new(),
        });
        self.generic_names.insert(name, id);
        id
    }

    /// Define a non-generic type, optionally as a subtype of another non-generic type.
    pub fn define_simple(
        &mut self,
        name: impl Into<Name>,
        parent: Option<GenericTypeId>,
    ) -> GenericTypeId {
        let id = self.define_generic(name, &[]);
        if let Some(parent) = parent {
            self.generics[id.index() as usize].parent = Some(GenericParent {
                def: parent,
                args: TypeIdVec::new(),
            });
        }
        id
    }

    /// Declare the supertype of `def`, written in terms of `def`'s own parameters.
    /// Must happen before `def` is instantiated.
    pub fn set_parent(
        &mut self,
        def: GenericTypeId,
        parent: GenericTypeId,
        args: &[TypeId],
    ) -> Result<(), ModelError> {
        let expected = self.generic_def(parent).params.len();
        if expected != args.len() {
            return Err(ModelError::WrongTypeArgCount {
                name: self.generic_def(parent).name.to_string(),
                expected,
                actual: args.len(),
            });
        }
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == def {
                return Err(ModelError::CyclicParent {
                    name: self.generic_def(def).name.to_string(),
                });
            }
            cursor = self.generic_def(current).parent.as_ref().map(|p| p.def);
        }
        debug_assert!(
            !self
                .types
                .iter()
                .any(|t| matches!(t, MType::Generic { def: d, .. } if *d == def)),
            "parent of {} declared after instantiation",
            self.generic_def(def).name
        );
        self.generics[def.index() as usize].parent = Some(GenericParent {
            def: parent,
            args: args.iter().copied().collect(),
        });
        Ok(())
    }

    /// Declare that values of `from` convert to `target` through `adapter`.
    pub fn add_conversion(&mut self, target: GenericTypeId, from: GenericTypeId, adapter: impl Into<Name>) {
        self.generics[target.index() as usize]
            .conversions
            .push(ConversionDecl {
                from,
                adapter: adapter.into(),
            });
    }

    pub fn generic_def(&self, id: GenericTypeId) -> &GenericTypeDef {
        &self.generics[id.index() as usize]
    }

    pub fn find_generic(&self, name: &str) -> Option<GenericTypeId> {
        self.generic_names.get(&Name::new(name)).copied()
    }

    // ========================================================================
    // Type construction
    // ========================================================================

    #[inline]
    pub fn error(&self) -> TypeId {
        TypeId::ERROR
    }

    /// Instantiate a generic type. Arguments for variant parameters are collapsed to
    /// their canonical type; invariant parameters keep wildcards.
    pub fn generic(&mut self, def: GenericTypeId, args: &[TypeSet]) -> TypeId {
        let mut args: TypeSetVec = args.iter().copied().collect();
        let gdef = &self.generics[def.index() as usize];
        debug_assert_eq!(
            gdef.params.len(),
            args.len(),
            "wrong arg count for {}",
            gdef.name
        );
        for (arg, &param) in args.iter_mut().zip(gdef.params.iter()) {
            match self.params[param.index() as usize].variance {
                Variance::Invariant => {}
                Variance::Out => *arg = TypeSet::One(arg.canonical_out()),
                Variance::In => *arg = TypeSet::One(arg.canonical_in()),
            }
        }
        let (id, fresh) = self.intern_fresh(MType::Generic { def, args });
        if fresh && let Some(parent) = self.generic_def(def).parent.clone() {
            let map = self.type_args_map(id);
            let parent_args: TypeSetVec = parent
                .args
                .iter()
                .map(|&a| self.substitute_set(TypeSet::One(a), &map))
                .collect();
            let parent_ty = self.generic(parent.def, &parent_args);
            self.parents.insert(id, parent_ty);
        }
        id
    }

    pub fn generic_of(&mut self, def: GenericTypeId, args: &[TypeId]) -> TypeId {
        let args: TypeSetVec = args.iter().map(|&t| TypeSet::One(t)).collect();
        self.generic(def, &args)
    }

    pub fn simple(&mut self, def: GenericTypeId) -> TypeId {
        self.generic(def, &[])
    }

    /// The definition instantiated with its own parameters (`list<T>`).
    pub fn common_type(&mut self, def: GenericTypeId) -> TypeId {
        let params: SmallVec<[TypeParamId; 2]> = self.generic_def(def).params.clone();
        let args: TypeSetVec = params.iter().map(|&p| TypeSet::One(self.param(p))).collect();
        self.generic(def, &args)
    }

    pub fn param(&mut self, id: TypeParamId) -> TypeId {
        self.intern(MType::Param(id))
    }

    pub fn nullable(&mut self, inner: TypeId) -> TypeId {
        match self.get(inner) {
            MType::Error | MType::Null | MType::Anything | MType::Nullable(_) => inner,
            MType::Nothing => TypeId::NULL,
            _ => self.intern(MType::Nullable(inner)),
        }
    }

    pub fn function(&mut self, params: &[TypeId], result: TypeId) -> TypeId {
        self.intern(MType::Function {
            params: params.iter().copied().collect(),
            result,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The direct supertype of a generic instantiation, per its definition's parent.
    pub fn parent_type(&self, id: TypeId) -> Option<TypeId> {
        self.parents.get(&id).copied()
    }

    pub fn unwrap_generic(&self, id: TypeId) -> Option<(GenericTypeId, &TypeSetVec)> {
        match self.get(id) {
            MType::Generic { def, args } => Some((*def, args)),
            _ => None,
        }
    }

    pub fn unwrap_nullable(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            MType::Nullable(inner) => Some(*inner),
            _ => None,
        }
    }

    pub fn unwrap_function(&self, id: TypeId) -> Option<(&TypeIdVec, TypeId)> {
        match self.get(id) {
            MType::Function { params, result } => Some((params, *result)),
            _ => None,
        }
    }

    pub fn unwrap_param(&self, id: TypeId) -> Option<TypeParamId> {
        match self.get(id) {
            MType::Param(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether `null` is a value of the type.
    pub fn is_nullable(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            MType::Null | MType::Nullable(_) | MType::Anything | MType::Error
        )
    }

    /// The type without its nullable wrapper.
    pub fn non_null(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            MType::Nullable(inner) => *inner,
            MType::Anything => TypeId::ANY,
            MType::Null => TypeId::NOTHING,
            _ => id,
        }
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// The type as written in source (`list<integer>`, `text?`, `(integer)->text`).
    pub fn display(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    pub fn display_set(&self, set: TypeSet) -> String {
        let mut out = String::new();
        self.write_set(&mut out, set);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId) {
        match self.get(id) {
            MType::Error => out.push_str("<error>"),
            MType::Unit => out.push_str("unit"),
            MType::Anything => out.push_str("anything"),
            MType::Any => out.push_str("any"),
            MType::Nothing => out.push_str("nothing"),
            MType::Null => out.push_str("null"),
            MType::Generic { def, args } => {
                out.push_str(self.generic_def(*def).name.as_str());
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        self.write_set(out, *arg);
                    }
                    out.push('>');
                }
            }
            MType::Param(p) => out.push_str(self.type_param(*p).name.as_str()),
            MType::Nullable(inner) => {
                if matches!(self.get(*inner), MType::Function { .. }) {
                    out.push('(');
                    self.write_type(out, *inner);
                    out.push(')');
                } else {
                    self.write_type(out, *inner);
                }
                out.push('?');
            }
            MType::Function { params, result } => {
                out.push('(');
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write_type(out, *p);
                }
                out.push_str(")->");
                self.write_type(out, *result);
            }
        }
    }

    fn write_set(&self, out: &mut String, set: TypeSet) {
        match set {
            TypeSet::One(t) => self.write_type(out, t),
            TypeSet::SubOf(t) => {
                out.push('-');
                self.write_type(out, t);
            }
            TypeSet::SuperOf(t) => {
                out.push('+');
                self.write_type(out, t);
            }
            TypeSet::All => out.push('*'),
        }
    }
}
