// type_id.rs
//
// TypeId: interned type handle with reserved constants for the built-in types.

use smallvec::SmallVec;

/// Interned type identity in the `TypeArena`.
///
/// Two types are structurally equal iff their ids are equal, because the arena
/// normalizes and deduplicates every type it interns.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    // ========================================================================
    // Reserved TypeIds, interned at these indices by TypeArena::new()
    // ========================================================================

    /// Compile-time error placeholder; compatible with everything
    pub const ERROR: TypeId = TypeId(0);
    pub const UNIT: TypeId = TypeId(1);
    /// Top type, including null
    pub const ANYTHING: TypeId = TypeId(2);
    /// Top of the non-null types
    pub const ANY: TypeId = TypeId(3);
    /// Bottom type
    pub const NOTHING: TypeId = TypeId(4);
    /// Type of the `null` literal
    pub const NULL: TypeId = TypeId(5);

    /// First non-reserved TypeId index
    pub const FIRST_DYNAMIC: u32 = 6;

    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn from_raw(index: u32) -> Self {
        TypeId(index)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

/// SmallVec for type children - inline up to 4 (covers most parameter lists)
pub type TypeIdVec = SmallVec<[TypeId; 4]>;
