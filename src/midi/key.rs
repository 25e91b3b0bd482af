use std::fmt;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Key identifier carried by note messages. The raw key byte maps onto it by
/// identity; only `A0..=C8` (the 88-key piano range) are named keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MidiKey(pub u8);

impl MidiKey {
    pub const A0: MidiKey = MidiKey(21);
    pub const A_SHARP0: MidiKey = MidiKey(22);
    pub const B0: MidiKey = MidiKey(23);
    pub const C1: MidiKey = MidiKey(24);
    pub const C_SHARP1: MidiKey = MidiKey(25);
    pub const D1: MidiKey = MidiKey(26);
    pub const D_SHARP1: MidiKey = MidiKey(27);
    pub const E1: MidiKey = MidiKey(28);
    pub const F1: MidiKey = MidiKey(29);
    pub const F_SHARP1: MidiKey = MidiKey(30);
    pub const G1: MidiKey = MidiKey(31);
    pub const G_SHARP1: MidiKey = MidiKey(32);
    pub const A1: MidiKey = MidiKey(33);
    pub const A_SHARP1: MidiKey = MidiKey(34);
    pub const B1: MidiKey = MidiKey(35);
    pub const C2: MidiKey = MidiKey(36);
    pub const C_SHARP2: MidiKey = MidiKey(37);
    pub const D2: MidiKey = MidiKey(38);
    pub const D_SHARP2: MidiKey = MidiKey(39);
    pub const E2: MidiKey = MidiKey(40);
    pub const F2: MidiKey = MidiKey(41);
    pub const F_SHARP2: MidiKey = MidiKey(42);
    pub const G2: MidiKey = MidiKey(43);
    pub const G_SHARP2: MidiKey = MidiKey(44);
    pub const A2: MidiKey = MidiKey(45);
    pub const A_SHARP2: MidiKey = MidiKey(46);
    pub const B2: MidiKey = MidiKey(47);
    pub const C3: MidiKey = MidiKey(48);
    pub const C_SHARP3: MidiKey = MidiKey(49);
    pub const D3: MidiKey = MidiKey(50);
    pub const D_SHARP3: MidiKey = MidiKey(51);
    pub const E3: MidiKey = MidiKey(52);
    pub const F3: MidiKey = MidiKey(53);
    pub const F_SHARP3: MidiKey = MidiKey(54);
    pub const G3: MidiKey = MidiKey(55);
    pub const G_SHARP3: MidiKey = MidiKey(56);
    pub const A3: MidiKey = MidiKey(57);
    pub const A_SHARP3: MidiKey = MidiKey(58);
    pub const B3: MidiKey = MidiKey(59);
    pub const C4: MidiKey = MidiKey(60);
    pub const C_SHARP4: MidiKey = MidiKey(61);
    pub const D4: MidiKey = MidiKey(62);
    pub const D_SHARP4: MidiKey = MidiKey(63);
    pub const E4: MidiKey = MidiKey(64);
    pub const F4: MidiKey = MidiKey(65);
    pub const F_SHARP4: MidiKey = MidiKey(66);
    pub const G4: MidiKey = MidiKey(67);
    pub const G_SHARP4: MidiKey = MidiKey(68);
    pub const A4: MidiKey = MidiKey(69);
    pub const A_SHARP4: MidiKey = MidiKey(70);
    pub const B4: MidiKey = MidiKey(71);
    pub const C5: MidiKey = MidiKey(72);
    pub const C_SHARP5: MidiKey = MidiKey(73);
    pub const D5: MidiKey = MidiKey(74);
    pub const D_SHARP5: MidiKey = MidiKey(75);
    pub const E5: MidiKey = MidiKey(76);
    pub const F5: MidiKey = MidiKey(77);
    pub const F_SHARP5: MidiKey = MidiKey(78);
    pub const G5: MidiKey = MidiKey(79);
    pub const G_SHARP5: MidiKey = MidiKey(80);
    pub const A5: MidiKey = MidiKey(81);
    pub const A_SHARP5: MidiKey = MidiKey(82);
    pub const B5: MidiKey = MidiKey(83);
    pub const C6: MidiKey = MidiKey(84);
    pub const C_SHARP6: MidiKey = MidiKey(85);
    pub const D6: MidiKey = MidiKey(86);
    pub const D_SHARP6: MidiKey = MidiKey(87);
    pub const E6: MidiKey = MidiKey(88);
    pub const F6: MidiKey = MidiKey(89);
    pub const F_SHARP6: MidiKey = MidiKey(90);
    pub const G6: MidiKey = MidiKey(91);
    pub const G_SHARP6: MidiKey = MidiKey(92);
    pub const A6: MidiKey = MidiKey(93);
    pub const A_SHARP6: MidiKey = MidiKey(94);
    pub const B6: MidiKey = MidiKey(95);
    pub const C7: MidiKey = MidiKey(96);
    pub const C_SHARP7: MidiKey = MidiKey(97);
    pub const D7: MidiKey = MidiKey(98);
    pub const D_SHARP7: MidiKey = MidiKey(99);
    pub const E7: MidiKey = MidiKey(100);
    pub const F7: MidiKey = MidiKey(101);
    pub const F_SHARP7: MidiKey = MidiKey(102);
    pub const G7: MidiKey = MidiKey(103);
    pub const G_SHARP7: MidiKey = MidiKey(104);
    pub const A7: MidiKey = MidiKey(105);
    pub const A_SHARP7: MidiKey = MidiKey(106);
    pub const B7: MidiKey = MidiKey(107);
    pub const C8: MidiKey = MidiKey(108);

    pub fn number(self) -> u8 {
        self.0
    }

    /// Whether the key lies in the named `A0..=C8` range
    pub fn is_known(self) -> bool {
        (Self::A0.0..=Self::C8.0).contains(&self.0)
    }

    /// Octave number with middle C (60) in octave 4
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }
}

impl From<u8> for MidiKey {
    fn from(value: u8) -> Self {
        MidiKey(value)
    }
}

impl fmt::Display for MidiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(
                f,
                "{}{}",
                NOTE_NAMES[usize::from(self.0 % 12)],
                self.octave()
            )
        } else {
            write!(f, "Key{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_range() {
        assert!(MidiKey::A0.is_known());
        assert!(MidiKey::C8.is_known());
        assert!(!MidiKey(20).is_known());
        assert!(!MidiKey(109).is_known());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(MidiKey::C4.to_string(), "C4");
        assert_eq!(MidiKey(61).to_string(), "C#4");
        assert_eq!(MidiKey::A0.to_string(), "A0");
        assert_eq!(MidiKey::C8.to_string(), "C8");
        assert_eq!(MidiKey(5).to_string(), "Key5");
    }

    #[test]
    fn test_identity_cast() {
        assert_eq!(MidiKey::from(0x3C), MidiKey::C4);
        assert_eq!(MidiKey::from(127).number(), 127);
    }

    #[test]
    fn test_named_constants_match_display() {
        assert_eq!(MidiKey::A_SHARP0, MidiKey(22));
        assert_eq!(MidiKey::B0.to_string(), "B0");
        assert_eq!(MidiKey::C_SHARP4.to_string(), "C#4");
        assert_eq!(MidiKey::G_SHARP7.to_string(), "G#7");
        assert_eq!(MidiKey::E3.number(), 52);
    }
}
