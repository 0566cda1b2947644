// session.rs
//
// A compilation session against one converted library: owns the type arena, the
// member cache and the diagnostics sink, and is the entry point for resolving
// names and compiling calls.

use std::rc::Rc;

use rell_identity::Name;
use rell_mtype::{TypeArena, TypeId, TypeSet};
use tracing::{debug, instrument};

use crate::args::{CallArg, CallSite};
use crate::call::{report_deprecated, CompileContext, CompiledCall};
use crate::case::LibCase;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::LibError;
use crate::function::{GlobalFunction, MemberFunction};
use crate::matching::{compile_call, param_type_hint};
use crate::member::{TypeMembers, ValueMember};
use crate::member_cache::MemberCache;
use crate::options::CompilerOptions;
use crate::partial::compile_partial;
use crate::registry::{Registry, RegistryEntry};

pub struct LibSession {
    arena: TypeArena,
    registry: Rc<Registry>,
    cache: MemberCache,
    diagnostics: Diagnostics,
    options: CompilerOptions,
}

impl LibSession {
    pub fn new(arena: TypeArena, registry: Rc<Registry>, options: CompilerOptions) -> Self {
        Self {
            arena,
            registry,
            cache: MemberCache::new(),
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut TypeArena {
        &mut self.arena
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub fn cache(&self) -> &MemberCache {
        &self.cache
    }

    pub fn members_of(&mut self, ty: TypeId) -> Rc<TypeMembers> {
        self.cache.members_of(&mut self.arena, &self.registry, ty)
    }

    fn context<'s>(&'s mut self, site: &'s CallSite) -> (&'s mut TypeArena, CompileContext<'s>) {
        (
            &mut self.arena,
            CompileContext {
                diagnostics: &mut self.diagnostics,
                options: &self.options,
                site,
            },
        )
    }

    fn error(&mut self, error: LibError, site: &CallSite) -> CompiledCall {
        self.diagnostics.add_error(error, site.span);
        CompiledCall::error()
    }

    // ========================================================================
    // Names and types
    // ========================================================================

    /// Resolve a (possibly dotted) name, reporting its deprecation.
    pub fn resolve_name(&mut self, site: &CallSite) -> Option<RegistryEntry> {
        let Some(entry) = self.registry.lookup(&site.name).cloned() else {
            self.diagnostics.add_error(
                LibError::UnknownName {
                    name: site.spelling(),
                    span: site.span.into(),
                },
                site.span,
            );
            return None;
        };
        if let Some(deprecated) = entry.deprecated() {
            report_deprecated(
                &mut self.diagnostics,
                &self.options,
                entry.declaration_kind(),
                site.spelling(),
                deprecated,
                site,
            );
        }
        Some(entry)
    }

    /// `name<args>` as a type. The error type if anything does not fit.
    pub fn instantiate(&mut self, site: &CallSite, args: &[TypeSet]) -> TypeId {
        match self.resolve_name(site) {
            Some(RegistryEntry::Type { typedef, .. }) => self.registry.instantiate(
                &mut self.arena,
                &typedef,
                args,
                site.span,
                &mut self.diagnostics,
            ),
            Some(_) => {
                self.diagnostics.add_error(
                    LibError::UnknownName {
                        name: site.spelling(),
                        span: site.span.into(),
                    },
                    site.span,
                );
                TypeId::ERROR
            }
            None => TypeId::ERROR,
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Call a resolved overload set. Wildcard arguments make it a partial application.
    pub fn call_global(
        &mut self,
        site: &CallSite,
        function: &GlobalFunction,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        self.call_cases(site, function.cases(), None, args, hint)
    }

    /// `name(args)` for a namespace function.
    #[instrument(level = "debug", skip(self, args, hint), fields(name = %site.spelling()))]
    pub fn call_function(&mut self, site: &CallSite, args: &[CallArg], hint: Option<TypeId>) -> CompiledCall {
        match self.resolve_name(site) {
            Some(RegistryEntry::Function(function)) => self.call_global(site, &function, args, hint),
            Some(_) => self.error(
                LibError::NotAFunction {
                    name: site.spelling(),
                    span: site.span.into(),
                },
                site,
            ),
            None => CompiledCall::error(),
        }
    }

    /// `value.name(args)`, the member name being the last segment of the site's name.
    #[instrument(level = "debug", skip(self, args, hint), fields(name = %site.spelling()))]
    pub fn call_member(
        &mut self,
        site: &CallSite,
        self_type: TypeId,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        match self.member_function(site, self_type) {
            Ok(function) => self.call_cases(site, function.cases(), Some(self_type), args, hint),
            Err(call) => call,
        }
    }

    /// The member function a site names on `self_type`. The first value member of
    /// that name decides; a property there shadows later functions.
    fn member_function(&mut self, site: &CallSite, self_type: TypeId) -> Result<Rc<MemberFunction>, CompiledCall> {
        if self_type.is_error() {
            return Err(CompiledCall::error());
        }
        let members = self.members_of(self_type);
        let name = site.name.last().as_str();
        let named = members.value_members_named(name);
        match named.first() {
            Some(ValueMember::Function(function)) => {
                debug!(cases = function.cases().len(), "member resolved");
                Ok(Rc::clone(function))
            }
            Some(ValueMember::Property { .. }) => Err(self.error(
                LibError::NotAFunction {
                    name: site.spelling(),
                    span: site.span.into(),
                },
                site,
            )),
            None => {
                let type_name = self.arena.display(self_type);
                Err(self.error(
                    LibError::UnknownMember {
                        type_name,
                        name: name.to_string(),
                        span: site.span.into(),
                    },
                    site,
                ))
            }
        }
    }

    /// `Type.name(args)` for a static member function.
    pub fn call_static(&mut self, site: &CallSite, ty: TypeId, args: &[CallArg], hint: Option<TypeId>) -> CompiledCall {
        if ty.is_error() {
            return CompiledCall::error();
        }
        let members = self.members_of(ty);
        let name = site.name.last().as_str();
        let Some(function) = members.static_function(name).cloned() else {
            let type_name = self.arena.display(ty);
            return self.error(
                LibError::UnknownMember {
                    type_name,
                    name: name.to_string(),
                    span: site.span.into(),
                },
                site,
            );
        };
        self.call_global(site, &function, args, hint)
    }

    /// `Type(args)`
    pub fn call_constructor(
        &mut self,
        site: &CallSite,
        ty: TypeId,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        if ty.is_error() {
            return CompiledCall::error();
        }
        let members = self.members_of(ty);
        let Some(constructor) = members.constructor.clone() else {
            let name = self.arena.display(ty);
            return self.error(
                LibError::NoConstructor {
                    name,
                    span: site.span.into(),
                },
                site,
            );
        };
        self.call_global(site, &constructor, args, hint)
    }

    fn call_cases(
        &mut self,
        site: &CallSite,
        cases: &[LibCase],
        self_type: Option<TypeId>,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        let (arena, mut ctx) = self.context(site);
        if args.iter().any(CallArg::is_wildcard) {
            return compile_partial(arena, &mut ctx, cases, self_type, args, hint);
        }
        compile_call(arena, &mut ctx, cases, self_type, args, hint)
    }

    // ========================================================================
    // Function values
    // ========================================================================

    /// Partial application of an overload set: `f(*)`, `f(1, *)`, or a bare `f`
    /// (pass a single wildcard) against the expected function type `hint`.
    pub fn compile_partial_global(
        &mut self,
        site: &CallSite,
        function: &GlobalFunction,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        let (arena, mut ctx) = self.context(site);
        compile_partial(arena, &mut ctx, function.cases(), None, args, hint)
    }

    /// Partial application of a member function: `value.name(*)`.
    pub fn compile_partial_member(
        &mut self,
        site: &CallSite,
        self_type: TypeId,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CompiledCall {
        let function = match self.member_function(site, self_type) {
            Ok(function) => function,
            Err(call) => return call,
        };
        let (arena, mut ctx) = self.context(site);
        compile_partial(arena, &mut ctx, function.cases(), Some(self_type), args, hint)
    }

    /// A namespace function used as a value, by name.
    pub fn function_value(&mut self, site: &CallSite, hint: Option<TypeId>) -> CompiledCall {
        match self.resolve_name(site) {
            Some(RegistryEntry::Function(function)) => {
                let args = [CallArg::wildcard(site.span)];
                self.compile_partial_global(site, &function, &args, hint)
            }
            Some(_) => self.error(
                LibError::NotAFunction {
                    name: site.spelling(),
                    span: site.span.into(),
                },
                site,
            ),
            None => CompiledCall::error(),
        }
    }

    /// The expected type of an argument, for typing the argument expression.
    pub fn param_type_hint(
        &mut self,
        cases: &[LibCase],
        self_type: Option<TypeId>,
        index: usize,
        name: Option<&Name>,
    ) -> Option<TypeId> {
        param_type_hint(&mut self.arena, cases, self_type, index, name)
    }
}
