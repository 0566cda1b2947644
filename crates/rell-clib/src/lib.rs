//! Compiled library: registry conversion and call resolution for system functions,
//! types and extensions.
//!
//! A [`LibModule`](rell_lmodel::LibModule) is converted once into a [`Registry`] of
//! overload sets, type facets and extensions. A [`LibSession`] then resolves names,
//! picks overload cases (inferring type parameters), and compiles calls and partial
//! applications, reporting problems to its [`Diagnostics`].

mod args;
mod call;
mod case;
mod diagnostics;
mod errors;
mod extension;
mod function;
mod matching;
mod member;
mod member_cache;
mod naming;
mod options;
mod partial;
mod registry;
mod session;
mod typedef;

pub use args::{ArgExpr, ArgValue, CallArg, CallSite};
pub use call::{BoundArg, CallTarget, CompileContext, CompiledCall, EffectiveArg};
pub use case::{
    CaseAttempt, CaseFailure, CaseMatch, ErrorMatch, LibCase, MatchError, NormalMatch, TypeArgNames,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::{LibError, RegistryError, UseInstead};
pub use extension::LibTypeExtension;
pub use function::{GlobalFunction, MemberFunction};
pub use matching::{compile_call, match_call, param_type_hint, report_no_match, NoMatch};
pub use member::{StaticMember, TypeBody, TypeMembers, ValueMember};
pub use member_cache::{compute_members, MemberCache};
pub use naming::CaseNaming;
pub use options::CompilerOptions;
pub use partial::{
    compile_partial, NormalPartialTarget, PartialMatch, PartialRejection, PartialTarget,
};
pub use registry::{Registry, RegistryEntry, RegistryNamespace};
pub use session::LibSession;
pub use typedef::LibTypeDef;
