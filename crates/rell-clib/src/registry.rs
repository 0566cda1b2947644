// registry.rs
//
// Registry conversion: the library model turned into lookup tables of overload sets,
// type facets and extensions. Conversion runs once per library; everything it
// produces is shared through `Rc`.

use std::rc::Rc;

use rell_identity::{ExtensionId, GenericTypeId, Name, QualifiedName, Span, TypeDefId};
use rell_lmodel::{
    DeclarationKind, Deprecated, FunctionBody, LibFunction, LibModule, Namespace,
    NamespaceMember, NamespaceMemberKind, TypeDef, TypeExtension,
};
use rell_mtype::{TypeArena, TypeId, TypeSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument, warn};

use crate::case::LibCase;
use crate::diagnostics::Diagnostics;
use crate::errors::{LibError, RegistryError};
use crate::extension::LibTypeExtension;
use crate::function::GlobalFunction;
use crate::naming::CaseNaming;
use crate::typedef::LibTypeDef;

/// What a name resolves to.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Namespace {
        namespace: Rc<RegistryNamespace>,
        deprecated: Option<Deprecated>,
    },
    Type {
        typedef: Rc<LibTypeDef>,
        deprecated: Option<Deprecated>,
    },
    Function(Rc<GlobalFunction>),
    Constant {
        name: QualifiedName,
        ty: TypeId,
        value: String,
        deprecated: Option<Deprecated>,
    },
    Property {
        name: QualifiedName,
        ty: TypeId,
        body: FunctionBody,
        deprecated: Option<Deprecated>,
    },
}

impl RegistryEntry {
    /// Deprecation of the name itself. Function deprecations live on their cases.
    pub fn deprecated(&self) -> Option<&Deprecated> {
        match self {
            RegistryEntry::Namespace { deprecated, .. }
            | RegistryEntry::Type { deprecated, .. }
            | RegistryEntry::Constant { deprecated, .. }
            | RegistryEntry::Property { deprecated, .. } => deprecated.as_ref(),
            RegistryEntry::Function(_) => None,
        }
    }

    pub fn declaration_kind(&self) -> DeclarationKind {
        match self {
            RegistryEntry::Namespace { .. } => DeclarationKind::Namespace,
            RegistryEntry::Type { .. } => DeclarationKind::Type,
            RegistryEntry::Function(_) => DeclarationKind::Function,
            RegistryEntry::Constant { .. } => DeclarationKind::Constant,
            RegistryEntry::Property { .. } => DeclarationKind::Property,
        }
    }

    /// An alias's own deprecation replaces the target's.
    fn aliased(self, alias: Option<&Deprecated>) -> Self {
        let Some(alias) = alias else {
            return self;
        };
        let deprecated = Some(alias.clone());
        match self {
            RegistryEntry::Namespace { namespace, .. } => RegistryEntry::Namespace {
                namespace,
                deprecated,
            },
            RegistryEntry::Type { typedef, .. } => RegistryEntry::Type {
                typedef,
                deprecated,
            },
            RegistryEntry::Constant { name, ty, value, .. } => RegistryEntry::Constant {
                name,
                ty,
                value,
                deprecated,
            },
            RegistryEntry::Property { name, ty, body, .. } => RegistryEntry::Property {
                name,
                ty,
                body,
                deprecated,
            },
            function @ RegistryEntry::Function(_) => function,
        }
    }
}

/// Names of one namespace, in declaration order.
#[derive(Debug, Default)]
pub struct RegistryNamespace {
    entries: Vec<(Name, RegistryEntry)>,
    index: FxHashMap<Name, usize>,
}

impl RegistryNamespace {
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        let index = *self.index.get(&Name::new(name))?;
        Some(&self.entries[index].1)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Name, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: Name, entry: RegistryEntry) {
        if self.index.contains_key(&name) {
            warn!(%name, "name declared twice, keeping the first declaration");
            return;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, entry));
    }
}

#[derive(Debug)]
pub struct Registry {
    name: Name,
    root: Rc<RegistryNamespace>,
    typedefs: FxHashMap<GenericTypeId, Rc<LibTypeDef>>,
    extensions: Vec<Rc<LibTypeExtension>>,
    extension_ids: FxHashSet<ExtensionId>,
}

impl Registry {
    /// Convert a library module. Type definitions are converted once, however many
    /// names refer to them.
    #[instrument(skip_all, fields(module = %module.name))]
    pub fn convert(module: &LibModule, arena: &mut TypeArena) -> Result<Registry, RegistryError> {
        let mut converter = Converter {
            arena,
            typedefs: FxHashMap::default(),
            entries: FxHashMap::default(),
            registry: Registry {
                name: module.name.clone(),
                root: Rc::default(),
                typedefs: FxHashMap::default(),
                extensions: Vec::new(),
                extension_ids: FxHashSet::default(),
            },
        };
        let root = converter.namespace(&module.namespace)?;
        let mut registry = converter.registry;
        registry.root = Rc::new(root);
        debug!(
            names = registry.root.len(),
            typedefs = registry.typedefs.len(),
            extensions = registry.extensions.len(),
            "registry converted"
        );
        Ok(registry)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn root(&self) -> &RegistryNamespace {
        &self.root
    }

    /// Resolve a dotted path through nested namespaces.
    pub fn lookup(&self, path: &QualifiedName) -> Option<&RegistryEntry> {
        let (last, init) = path.parts().split_last()?;
        let mut namespace: &RegistryNamespace = &self.root;
        for part in init {
            match namespace.get(part.as_str())? {
                RegistryEntry::Namespace { namespace: inner, .. } => namespace = inner.as_ref(),
                _ => return None,
            }
        }
        namespace.get(last.as_str())
    }

    pub fn typedef_of(&self, generic: GenericTypeId) -> Option<&Rc<LibTypeDef>> {
        self.typedefs.get(&generic)
    }

    /// The definition `ty` instantiates, if it is a library type.
    pub fn typedef_of_type(&self, arena: &TypeArena, ty: TypeId) -> Option<&Rc<LibTypeDef>> {
        let (generic, _) = arena.unwrap_generic(ty)?;
        self.typedef_of(generic)
    }

    pub fn typedefs(&self) -> impl Iterator<Item = &Rc<LibTypeDef>> {
        self.typedefs.values()
    }

    /// In registration order.
    pub fn extensions(&self) -> &[Rc<LibTypeExtension>] {
        &self.extensions
    }

    pub fn register_extension(&mut self, extension: Rc<LibTypeExtension>) -> Result<(), RegistryError> {
        if !self.extension_ids.insert(extension.id()) {
            return Err(RegistryError::DuplicateExtension {
                name: extension.name().str(),
            });
        }
        debug!(extension = %extension.name().str(), "extension registered");
        self.extensions.push(extension);
        Ok(())
    }

    /// Apply type arguments to a library type (`map<text, integer>`). Reports and
    /// returns the error type when the arguments do not fit.
    pub fn instantiate(
        &self,
        arena: &mut TypeArena,
        typedef: &LibTypeDef,
        args: &[TypeSet],
        span: Span,
        diagnostics: &mut Diagnostics,
    ) -> TypeId {
        let name = typedef.simple_name().to_string();
        let expected = typedef.params().len();
        let error = if !typedef.is_generic() && !args.is_empty() {
            Some(LibError::NotGeneric {
                name,
                span: span.into(),
            })
        } else if typedef.is_generic() && args.is_empty() {
            Some(LibError::NoTypeArgs {
                name,
                span: span.into(),
            })
        } else if args.len() != expected {
            Some(LibError::WrongTypeArgCount {
                name,
                expected,
                actual: args.len(),
                span: span.into(),
            })
        } else if let Err(violation) = arena.check_type_args(typedef.generic(), args) {
            Some(LibError::BoundViolation {
                violation,
                span: span.into(),
            })
        } else {
            None
        };
        match error {
            Some(error) => {
                diagnostics.add_error(error, span);
                TypeId::ERROR
            }
            None => arena.generic(typedef.generic(), args),
        }
    }
}

type Slot = (Name, SlotValue);

enum SlotValue {
    Entry(RegistryEntry),
    Functions {
        name: QualifiedName,
        cases: Vec<LibCase>,
    },
}

struct Converter<'a> {
    arena: &'a mut TypeArena,
    typedefs: FxHashMap<TypeDefId, Rc<LibTypeDef>>,
    /// Converted members by identity, so that aliases share their target's entry
    entries: FxHashMap<*const NamespaceMember, RegistryEntry>,
    registry: Registry,
}

impl Converter<'_> {
    fn namespace(&mut self, namespace: &Namespace) -> Result<RegistryNamespace, RegistryError> {
        let mut slots: Vec<Slot> = Vec::new();
        for member in &namespace.members {
            let name = member.simple_name().clone();
            match &member.kind {
                NamespaceMemberKind::Extension(ext) => self.extension(ext)?,
                NamespaceMemberKind::Function {
                    function,
                    deprecated,
                } => {
                    let case = LibCase::global(
                        CaseNaming::Qualified(member.qualified_name.clone()),
                        Rc::clone(function),
                    )
                    .deprecated(deprecated.clone());
                    push_case(&mut slots, name, &member.qualified_name, case);
                }
                NamespaceMemberKind::Alias { target, deprecated } => {
                    if let Some(function) = alias_function(target) {
                        let case = LibCase::global(
                            CaseNaming::Qualified(member.qualified_name.clone()),
                            Rc::clone(function),
                        )
                        .deprecated(deprecated.clone());
                        push_case(&mut slots, name, &member.qualified_name, case);
                    } else if let Some(entry) = self.entry(target)? {
                        slots.push((name, SlotValue::Entry(entry.aliased(deprecated.as_ref()))));
                    }
                }
                NamespaceMemberKind::Type { typedef, .. } if typedef.hidden => {
                    self.typedef(typedef)?;
                }
                _ => {
                    if let Some(entry) = self.entry(member)? {
                        slots.push((name, SlotValue::Entry(entry)));
                    }
                }
            }
        }

        let mut converted = RegistryNamespace::default();
        for (name, slot) in slots {
            let entry = match slot {
                SlotValue::Entry(entry) => entry,
                SlotValue::Functions { name: full, cases } => RegistryEntry::Function(Rc::new(
                    GlobalFunction::new(full.str(), name.clone(), cases),
                )),
            };
            converted.insert(name, entry);
        }
        Ok(converted)
    }

    /// The entry of a non-function member, converted once per member.
    fn entry(&mut self, member: &Rc<NamespaceMember>) -> Result<Option<RegistryEntry>, RegistryError> {
        let key = Rc::as_ptr(member);
        if let Some(entry) = self.entries.get(&key) {
            return Ok(Some(entry.clone()));
        }
        let entry = match &member.kind {
            NamespaceMemberKind::Namespace(namespace) => Some(RegistryEntry::Namespace {
                namespace: Rc::new(self.namespace(namespace)?),
                deprecated: None,
            }),
            NamespaceMemberKind::Type {
                typedef,
                deprecated,
            } => Some(RegistryEntry::Type {
                typedef: self.typedef(typedef)?,
                deprecated: deprecated.clone(),
            }),
            NamespaceMemberKind::Constant(c) => Some(RegistryEntry::Constant {
                name: member.qualified_name.clone(),
                ty: c.ty,
                value: c.value.clone(),
                deprecated: c.deprecated.clone(),
            }),
            NamespaceMemberKind::Property(p) => Some(RegistryEntry::Property {
                name: member.qualified_name.clone(),
                ty: p.ty,
                body: p.body.clone(),
                deprecated: p.deprecated.clone(),
            }),
            NamespaceMemberKind::Function {
                function,
                deprecated,
            } => {
                let case = LibCase::global(
                    CaseNaming::Qualified(member.qualified_name.clone()),
                    Rc::clone(function),
                )
                .deprecated(deprecated.clone());
                Some(RegistryEntry::Function(Rc::new(GlobalFunction::new(
                    member.qualified_name.str(),
                    member.simple_name().clone(),
                    vec![case],
                ))))
            }
            NamespaceMemberKind::Alias { target, deprecated } => self
                .entry(target)?
                .map(|entry| entry.aliased(deprecated.as_ref())),
            // Extensions are unnamed facets
            NamespaceMemberKind::Extension(_) => None,
        };
        if let Some(entry) = &entry {
            self.entries.insert(key, entry.clone());
        }
        Ok(entry)
    }

    fn typedef(&mut self, model: &Rc<TypeDef>) -> Result<Rc<LibTypeDef>, RegistryError> {
        if let Some(typedef) = self.typedefs.get(&model.id) {
            return Ok(Rc::clone(typedef));
        }
        let typedef = Rc::new(LibTypeDef::convert(self.arena, model)?);
        self.typedefs.insert(model.id, Rc::clone(&typedef));
        self.registry.typedefs.insert(model.generic, Rc::clone(&typedef));
        Ok(typedef)
    }

    fn extension(&mut self, model: &Rc<TypeExtension>) -> Result<(), RegistryError> {
        let extension = LibTypeExtension::convert(self.arena, model)?;
        self.registry.register_extension(Rc::new(extension))
    }
}

/// The function an alias (possibly through other aliases) refers to.
fn alias_function(target: &Rc<NamespaceMember>) -> Option<&Rc<LibFunction>> {
    match &target.kind {
        NamespaceMemberKind::Function { function, .. } => Some(function),
        NamespaceMemberKind::Alias { target, .. } => alias_function(target),
        _ => None,
    }
}

/// Functions of the same name merge into one overload set at the first declaration.
fn push_case(slots: &mut Vec<Slot>, name: Name, full_name: &QualifiedName, case: LibCase) {
    for (slot_name, slot) in slots.iter_mut() {
        if *slot_name != name {
            continue;
        }
        match slot {
            SlotValue::Functions { cases, .. } => cases.push(case),
            SlotValue::Entry(_) => warn!(%name, "function shadowed by an earlier declaration"),
        }
        return;
    }
    slots.push((
        name,
        SlotValue::Functions {
            name: full_name.clone(),
            cases: vec![case],
        },
    ));
}
