use std::fmt::Display;

/// The verdict for one signal: does it reach a data sink, a selection-class
/// port, both, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Role {
    pub data: bool,
    pub select: bool,
}

impl Role {
    pub const NONE: Role = Role { data: false, select: false };
    pub const DATA: Role = Role { data: true, select: false };
    pub const SELECT: Role = Role { data: false, select: true };

    pub fn new(data: bool, select: bool) -> Role {
        Role { data, select }
    }

    /// OR-reduction of two verdicts.
    pub fn merge(self, other: Role) -> Role {
        Role { data: self.data || other.data, select: self.select || other.select }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.data, self.select) {
            (false, false) => write!(f, "none"),
            (true, false) => write!(f, "data"),
            (false, true) => write!(f, "select"),
            (true, true) => write!(f, "both"),
        }
    }
}

/// Per-bit classification code.
///
/// The four codes form a lattice `None < {Data, Select} < Both`; a bit's code
/// only ever moves up the lattice as more evidence is joined in, never down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitRole {
    #[default]
    None,
    Data,
    Select,
    Both,
}

impl BitRole {
    /// Joins a verdict into this code, moving up the lattice.
    pub fn join(self, role: Role) -> BitRole {
        let data = role.data || matches!(self, BitRole::Data | BitRole::Both);
        let select = role.select || matches!(self, BitRole::Select | BitRole::Both);
        match (data, select) {
            (false, false) => BitRole::None,
            (true, false) => BitRole::Data,
            (false, true) => BitRole::Select,
            (true, true) => BitRole::Both,
        }
    }

    /// The verdict pair this code encodes.
    pub fn as_role(self) -> Role {
        Role {
            data: matches!(self, BitRole::Data | BitRole::Both),
            select: matches!(self, BitRole::Select | BitRole::Both),
        }
    }

    /// Lattice height, for monotonicity comparisons: `None` is 0, `Both` is 2.
    pub fn level(self) -> u32 {
        match self {
            BitRole::None => 0,
            BitRole::Data | BitRole::Select => 1,
            BitRole::Both => 2,
        }
    }
}
