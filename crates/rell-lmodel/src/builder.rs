// builder.rs
//
// Declaration API for library modules. Types are defined in the TypeArena up front
// (`declare_type`), then namespaces and members are assembled with closures.

use std::rc::Rc;

use rell_identity::{
    ExtensionId, GenericTypeId, Name, QualifiedName, TypeDefId, TypeParamId,
};
use rell_mtype::{FunctionHeader, FunctionParam, ModelError, TypeArena, TypeId, TypeSet, Variance};
use smallvec::SmallVec;
use tracing::debug;

use crate::deprecation::Deprecated;
use crate::doc::{DocSymbol, DocSymbolKind};
use crate::errors::DeclError;
use crate::function::{FunctionBody, LibFunction};
use crate::namespace::{LibModule, Namespace, NamespaceMember, NamespaceMemberKind};
use crate::typedef::{
    LibConstant, LibConstructor, LibProperty, TypeDef, TypeDefAlias, TypeDefFunction,
    TypeDefMember, TypeExtension,
};

#[derive(Debug, Clone)]
pub struct TypeParamDecl {
    pub name: Name,
    pub variance: Variance,
    pub bounds: TypeSet,
}

impl TypeParamDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: Name::new(name),
            variance: Variance::Invariant,
            bounds: TypeSet::All,
        }
    }

    pub fn out(name: &str) -> Self {
        Self {
            variance: Variance::Out,
            ..Self::new(name)
        }
    }

    pub fn bounded(mut self, bounds: TypeSet) -> Self {
        self.bounds = bounds;
        self
    }
}

/// A declared type: its generic definition, parameters and self type (`list<T>`).
#[derive(Debug, Clone)]
pub struct TypeHandle {
    pub generic: GenericTypeId,
    pub params: SmallVec<[TypeParamId; 2]>,
    pub param_types: SmallVec<[TypeId; 2]>,
    pub self_type: TypeId,
}

impl TypeHandle {
    /// The type reference of the `index`-th parameter (`T` of `list<T>`).
    pub fn param(&self, index: usize) -> TypeId {
        self.param_types[index]
    }
}

/// A function or constructor declaration before validation.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    type_params: Vec<TypeParamId>,
    result: Option<TypeId>,
    params: Vec<FunctionParam>,
    body: FunctionBody,
    deprecated: Option<Deprecated>,
}

impl FunctionDecl {
    pub fn new(result: TypeId, body: FunctionBody) -> Self {
        Self {
            type_params: Vec::new(),
            result: Some(result),
            params: Vec::new(),
            body,
            deprecated: None,
        }
    }

    /// The result type is not known statically.
    pub fn unknown_result(body: FunctionBody) -> Self {
        Self {
            result: None,
            ..Self::new(TypeId::UNIT, body)
        }
    }

    /// A constructor; the result is set to the owning type.
    pub fn constructor(body: FunctionBody) -> Self {
        Self::unknown_result(body)
    }

    pub fn type_params(mut self, params: &[TypeParamId]) -> Self {
        self.type_params = params.to_vec();
        self
    }

    pub fn param(mut self, param: FunctionParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn deprecated(mut self, deprecated: Deprecated) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    fn header(&self, arena: &TypeArena, result: Option<TypeId>) -> Result<FunctionHeader, ModelError> {
        FunctionHeader::new(arena, &self.type_params, result, self.params.clone())
    }
}

pub struct ModuleBuilder<'a> {
    arena: &'a mut TypeArena,
    next_typedef: u32,
    next_extension: u32,
    path: Vec<Name>,
    members: Vec<Rc<NamespaceMember>>,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(arena: &'a mut TypeArena) -> Self {
        Self {
            arena,
            next_typedef: 0,
            next_extension: 0,
            path: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Build a whole module in one closure.
    pub fn build(
        arena: &'a mut TypeArena,
        name: &str,
        declare: impl FnOnce(&mut ModuleBuilder<'a>) -> Result<(), DeclError>,
    ) -> Result<LibModule, DeclError> {
        let mut builder = ModuleBuilder::new(arena);
        declare(&mut builder)?;
        Ok(builder.finish(name))
    }

    pub fn finish(self, name: &str) -> LibModule {
        debug!(module = name, members = self.members.len(), "library module built");
        LibModule {
            name: Name::new(name),
            namespace: Namespace {
                members: self.members,
            },
        }
    }

    pub fn arena(&mut self) -> &mut TypeArena {
        self.arena
    }

    fn qualified(&self, name: &str) -> QualifiedName {
        let mut parts = self.path.iter();
        match parts.next() {
            None => QualifiedName::of(Name::new(name)),
            Some(first) => parts
                .fold(QualifiedName::of(first.clone()), |q, p| q.child(p.clone()))
                .child(Name::new(name)),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn declare_type(&mut self, name: &str, params: &[TypeParamDecl]) -> TypeHandle {
        let ids: SmallVec<[TypeParamId; 2]> = params
            .iter()
            .map(|p| self.arena.define_type_param(p.name.clone(), p.variance, p.bounds))
            .collect();
        let generic = self.arena.define_generic(name, &ids);
        self.handle(generic)
    }

    pub fn declare_simple(&mut self, name: &str, parent: Option<&TypeHandle>) -> TypeHandle {
        let generic = self.arena.define_simple(name, parent.map(|p| p.generic));
        self.handle(generic)
    }

    /// Declare the supertype of `child` in terms of `child`'s parameters. Must come
    /// before anything instantiates `child`.
    pub fn set_parent(
        &mut self,
        child: &TypeHandle,
        parent: &TypeHandle,
        args: &[TypeId],
    ) -> Result<(), DeclError> {
        Ok(self.arena.set_parent(child.generic, parent.generic, args)?)
    }

    pub fn add_conversion(&mut self, target: &TypeHandle, from: &TypeHandle, adapter: &str) {
        self.arena.add_conversion(target.generic, from.generic, adapter);
    }

    /// A function-level type parameter.
    pub fn type_param(&mut self, decl: TypeParamDecl) -> (TypeParamId, TypeId) {
        let id = self.arena.define_type_param(decl.name, decl.variance, decl.bounds);
        (id, self.arena.param(id))
    }

    fn handle(&mut self, generic: GenericTypeId) -> TypeHandle {
        let params = self.arena.generic_def(generic).params.clone();
        let param_types = params.iter().map(|&p| self.arena.param(p)).collect();
        let self_type = self.arena.common_type(generic);
        TypeHandle {
            generic,
            params,
            param_types,
            self_type,
        }
    }

    // ========================================================================
    // Namespace members
    // ========================================================================

    /// Add a member built by hand.
    pub fn push(&mut self, member: NamespaceMember) -> Rc<NamespaceMember> {
        let member = Rc::new(member);
        self.members.push(Rc::clone(&member));
        member
    }

    pub fn namespace(
        &mut self,
        name: &str,
        declare: impl FnOnce(&mut Self) -> Result<(), DeclError>,
    ) -> Result<Rc<NamespaceMember>, DeclError> {
        let qualified_name = self.qualified(name);
        let outer = std::mem::take(&mut self.members);
        self.path.push(Name::new(name));
        let result = declare(self);
        self.path.pop();
        let members = std::mem::replace(&mut self.members, outer);
        result?;
        let doc = DocSymbol::new(
            DocSymbolKind::Namespace,
            qualified_name.str(),
            format!("namespace {}", qualified_name.str()),
        );
        Ok(self.push(NamespaceMember {
            qualified_name,
            doc,
            kind: NamespaceMemberKind::Namespace(Namespace { members }),
        }))
    }

    pub fn type_def(
        &mut self,
        ty: &TypeHandle,
        declare: impl FnOnce(&mut TypeDefBuilder<'_>) -> Result<(), DeclError>,
    ) -> Result<Rc<NamespaceMember>, DeclError> {
        let name = self.arena.generic_def(ty.generic).name.clone();
        let qualified_name = self.qualified(name.as_str());
        let mut builder = TypeDefBuilder::new(
            self.arena,
            qualified_name.clone(),
            ty.self_type,
            ty.params.to_vec(),
            false,
        );
        declare(&mut builder)?;
        let (members, hidden, deprecated) = (builder.members, builder.hidden, builder.deprecated);

        let id = TypeDefId::new(self.next_typedef);
        self.next_typedef += 1;
        let doc = DocSymbol::new(
            DocSymbolKind::Type,
            qualified_name.str(),
            format!("type {}", self.arena.display(ty.self_type)),
        );
        let typedef = Rc::new(TypeDef {
            id,
            qualified_name: qualified_name.clone(),
            generic: ty.generic,
            members,
            hidden,
            doc: doc.clone(),
        });
        Ok(self.push(NamespaceMember {
            qualified_name,
            doc,
            kind: NamespaceMemberKind::Type {
                typedef,
                deprecated,
            },
        }))
    }

    /// Members for every type in `SubOf(self_type)`, with `type_params` inferred from
    /// the receiver.
    pub fn extension(
        &mut self,
        name: &str,
        type_params: &[TypeParamId],
        self_type: TypeId,
        declare: impl FnOnce(&mut TypeDefBuilder<'_>) -> Result<(), DeclError>,
    ) -> Result<Rc<NamespaceMember>, DeclError> {
        let qualified_name = self.qualified(name);
        let mut builder = TypeDefBuilder::new(
            self.arena,
            qualified_name.clone(),
            self_type,
            type_params.to_vec(),
            true,
        );
        declare(&mut builder)?;
        let members = builder.members;

        let id = ExtensionId::new(self.next_extension);
        self.next_extension += 1;
        let doc = DocSymbol::new(
            DocSymbolKind::Extension,
            qualified_name.str(),
            format!("extension {}: {}", name, self.arena.display(self_type)),
        );
        let ext = Rc::new(TypeExtension {
            id,
            qualified_name: qualified_name.clone(),
            type_params: type_params.to_vec(),
            self_type,
            members,
            doc: doc.clone(),
        });
        Ok(self.push(NamespaceMember {
            qualified_name,
            doc,
            kind: NamespaceMemberKind::Extension(ext),
        }))
    }

    pub fn function(&mut self, name: &str, decl: FunctionDecl) -> Result<Rc<NamespaceMember>, DeclError> {
        let qualified_name = self.qualified(name);
        let header = decl.header(self.arena, decl.result)?;
        let function = LibFunction {
            qualified_name: qualified_name.clone(),
            header,
            body: decl.body,
        };
        let doc = DocSymbol::new(
            DocSymbolKind::Function,
            qualified_name.str(),
            function.signature(self.arena, name),
        );
        Ok(self.push(NamespaceMember {
            qualified_name,
            doc,
            kind: NamespaceMemberKind::Function {
                function: Rc::new(function),
                deprecated: decl.deprecated,
            },
        }))
    }

    pub fn constant(&mut self, name: &str, ty: TypeId, value: &str) -> Rc<NamespaceMember> {
        let qualified_name = self.qualified(name);
        let constant = constant(self.arena, &qualified_name, ty, value);
        self.push(NamespaceMember {
            qualified_name,
            doc: constant.doc.clone(),
            kind: NamespaceMemberKind::Constant(constant),
        })
    }

    pub fn property(&mut self, name: &str, ty: TypeId, body: FunctionBody) -> Rc<NamespaceMember> {
        let qualified_name = self.qualified(name);
        let property = property(self.arena, &qualified_name, ty, body);
        self.push(NamespaceMember {
            qualified_name,
            doc: property.doc.clone(),
            kind: NamespaceMemberKind::Property(property),
        })
    }

    pub fn alias(
        &mut self,
        name: &str,
        target: &Rc<NamespaceMember>,
        deprecated: Option<Deprecated>,
    ) -> Rc<NamespaceMember> {
        let qualified_name = self.qualified(name);
        let doc = DocSymbol::new(
            DocSymbolKind::Alias,
            qualified_name.str(),
            format!("alias {} = {}", name, target.qualified_name.str()),
        );
        self.push(NamespaceMember {
            qualified_name,
            doc,
            kind: NamespaceMemberKind::Alias {
                target: Rc::clone(target),
                deprecated,
            },
        })
    }
}

fn constant(arena: &TypeArena, name: &QualifiedName, ty: TypeId, value: &str) -> LibConstant {
    LibConstant {
        simple_name: name.last().clone(),
        ty,
        value: value.to_string(),
        deprecated: None,
        doc: DocSymbol::new(
            DocSymbolKind::Constant,
            name.str(),
            format!("const {}: {} = {}", name.last(), arena.display(ty), value),
        ),
    }
}

fn property(arena: &TypeArena, name: &QualifiedName, ty: TypeId, body: FunctionBody) -> LibProperty {
    LibProperty {
        simple_name: name.last().clone(),
        ty,
        body,
        deprecated: None,
        doc: DocSymbol::new(
            DocSymbolKind::Property,
            name.str(),
            format!("property {}: {}", name.last(), arena.display(ty)),
        ),
    }
}

/// Members of one type definition or extension.
pub struct TypeDefBuilder<'b> {
    arena: &'b mut TypeArena,
    qualified_name: QualifiedName,
    self_type: TypeId,
    type_params: Vec<TypeParamId>,
    is_extension: bool,
    members: Vec<TypeDefMember>,
    hidden: bool,
    deprecated: Option<Deprecated>,
}

impl<'b> TypeDefBuilder<'b> {
    fn new(
        arena: &'b mut TypeArena,
        qualified_name: QualifiedName,
        self_type: TypeId,
        type_params: Vec<TypeParamId>,
        is_extension: bool,
    ) -> Self {
        Self {
            arena,
            qualified_name,
            self_type,
            type_params,
            is_extension,
            members: Vec::new(),
            hidden: false,
            deprecated: None,
        }
    }

    pub fn arena(&mut self) -> &mut TypeArena {
        self.arena
    }

    pub fn self_type(&self) -> TypeId {
        self.self_type
    }

    pub fn type_params(&self) -> &[TypeParamId] {
        &self.type_params
    }

    pub fn hidden(&mut self) {
        self.hidden = true;
    }

    pub fn deprecated(&mut self, deprecated: Deprecated) {
        self.deprecated = Some(deprecated);
    }

    fn member_name(&self, name: &str) -> QualifiedName {
        self.qualified_name.child(Name::new(name))
    }

    pub fn constant(&mut self, name: &str, ty: TypeId, value: &str) {
        let qualified_name = self.member_name(name);
        let constant = constant(self.arena, &qualified_name, ty, value);
        self.members.push(TypeDefMember::Constant(constant));
    }

    pub fn property(&mut self, name: &str, ty: TypeId, body: FunctionBody) {
        let qualified_name = self.member_name(name);
        let property = property(self.arena, &qualified_name, ty, body);
        self.members.push(TypeDefMember::Property(property));
    }

    pub fn constructor(&mut self, decl: FunctionDecl) -> Result<(), DeclError> {
        if self.is_extension {
            return Err(DeclError::ConstructorInExtension {
                name: self.qualified_name.str(),
            });
        }
        let header = decl.header(self.arena, Some(self.self_type))?;
        let type_name = self.arena.display(self.self_type);
        let doc = DocSymbol::new(
            DocSymbolKind::Constructor,
            self.qualified_name.str(),
            format!("constructor {}", header.display_named(self.arena, &type_name)),
        );
        self.members.push(TypeDefMember::Constructor(LibConstructor {
            header,
            body: decl.body,
            deprecated: decl.deprecated,
            doc,
        }));
        Ok(())
    }

    pub fn function(&mut self, name: &str, decl: FunctionDecl) -> Result<(), DeclError> {
        self.add_function(name, decl, false)
    }

    pub fn static_function(&mut self, name: &str, decl: FunctionDecl) -> Result<(), DeclError> {
        self.add_function(name, decl, true)
    }

    fn add_function(&mut self, name: &str, decl: FunctionDecl, is_static: bool) -> Result<(), DeclError> {
        let qualified_name = self.member_name(name);
        let header = decl.header(self.arena, decl.result)?;
        let function = LibFunction {
            qualified_name: qualified_name.clone(),
            header,
            body: decl.body,
        };
        let signature = function.signature(self.arena, name);
        let declaration = if is_static {
            format!("static {signature}")
        } else {
            signature
        };
        self.members.push(TypeDefMember::Function(TypeDefFunction {
            function: Rc::new(function),
            is_static,
            deprecated: decl.deprecated,
            doc: DocSymbol::new(DocSymbolKind::Function, qualified_name.str(), declaration),
        }));
        Ok(())
    }

    /// Another name for the first member declared as `target`.
    pub fn alias(
        &mut self,
        name: &str,
        target: &str,
        deprecated: Option<Deprecated>,
    ) -> Result<(), DeclError> {
        let Some(index) = self
            .members
            .iter()
            .position(|m| m.simple_name().is_some_and(|n| n.as_str() == target))
        else {
            return Err(DeclError::UnknownAliasTarget {
                type_name: self.qualified_name.str(),
                alias: name.to_string(),
                target: target.to_string(),
            });
        };
        let qualified_name = self.member_name(name);
        self.members.push(TypeDefMember::Alias(TypeDefAlias {
            simple_name: Name::new(name),
            target: index,
            deprecated,
            doc: DocSymbol::new(
                DocSymbolKind::Alias,
                qualified_name.str(),
                format!("alias {name} = {target}"),
            ),
        }));
        Ok(())
    }
}
