/*!
Atoms and literals of the satisfiability core.

An atom is an unsigned integer; atoms form a contiguous range from 1 to some limit, with 0 reserved.
A literal aliases a signed integer whose absolute value is the atom and whose sign is the polarity --- the DIMACS convention, kept internal so a literal is a single machine word.
*/

/// An atom of the solver, from a contiguous range starting at 1.
pub type Atom = u32;

/// A literal: an atom paired with a polarity, packed as a signed integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SatLiteral(i32);

impl SatLiteral {
    /// A fresh literal, specified by pairing an atom with a polarity.
    pub fn new(atom: Atom, polarity: bool) -> Self {
        match polarity {
            true => SatLiteral(atom as i32),
            false => SatLiteral(-(atom as i32)),
        }
    }

    /// The atom of the literal.
    pub fn atom(&self) -> Atom {
        self.0.unsigned_abs()
    }

    /// The polarity of the literal.
    pub fn polarity(&self) -> bool {
        self.0 > 0
    }

    /// The negation of the literal.
    pub fn negate(&self) -> Self {
        SatLiteral(-self.0)
    }

    /// The literal in its integer form, with sign indicating polarity.
    pub fn as_int(&self) -> i32 {
        self.0
    }

    /// A literal from its integer form.
    ///
    /// Zero is not a literal; callers in the DIMACS reader treat it as the clause terminator.
    pub fn from_int(int: i32) -> Self {
        SatLiteral(int)
    }

    /// An index for watch lists: even for negative polarity, odd for positive.
    pub fn index(&self) -> usize {
        (2 * self.atom() as usize) + (self.polarity() as usize)
    }
}

impl std::ops::Neg for SatLiteral {
    type Output = SatLiteral;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl std::fmt::Display for SatLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let literal = SatLiteral::new(79, true);
        assert_eq!(literal.atom(), 79);
        assert!(literal.polarity());
        assert_eq!(literal.negate().as_int(), -79);
        assert_eq!((-literal).atom(), 79);
    }

    #[test]
    fn indices_are_distinct() {
        let positive = SatLiteral::new(3, true);
        let negative = SatLiteral::new(3, false);
        assert_ne!(positive.index(), negative.index());
        assert_eq!(positive.index(), 7);
        assert_eq!(negative.index(), 6);
    }
}
