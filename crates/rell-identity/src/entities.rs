//! First-class identity types for library entities.
//!
//! Library declarations are converted once and then shared across many call sites,
//! so everything that needs memoization or identity comparison gets a dedicated id.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a generic type constructor in the type arena (`list<T>`, `integer`)
    pub struct GenericTypeId;
}

define_entity_id! {
    /// Identity for a type parameter (the `T` of `list<T>` or of `fun <T> f(x: T)`)
    pub struct TypeParamId;
}

define_entity_id! {
    /// Identity for a library type definition; the memoization key of registry conversion
    pub struct TypeDefId;
}

define_entity_id! {
    /// Identity for an extension type definition
    pub struct ExtensionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_index() {
        assert_eq!(TypeDefId::new(3), TypeDefId::new(3));
        assert_ne!(TypeDefId::new(3), TypeDefId::new(4));
        assert_eq!(GenericTypeId::new(7).index(), 7);
        assert!(TypeParamId::new(1) < TypeParamId::new(2));
    }
}
