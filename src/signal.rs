use concat_idents::concat_idents;
use std::fmt::{self, Display, Formatter};
use strum_macros::{Display as StrumDisplay, EnumString};

/// Largest width a signal can have.
pub const MAX_WIDTH: u32 = 64;

/// Compile time check for the width parameter of port handles.
///
/// Referencing [WidthCheck::VALID] with a width outside of `1..=64`
/// fails to compile.
pub(crate) struct WidthCheck<const W: u32>;
impl<const W: u32> WidthCheck<W> {
    pub(crate) const VALID: () = assert!(W >= 1 && W <= MAX_WIDTH, "signal width must be in 1..=64");
}

/// Generates the lossy fixed type views for [SignalValue].
macro_rules! value_views {
    ($ty:ident,$($rest:ident),*) => {
        value_views!($ty);
        value_views!($($rest),*);
    };
    ($ty:ident) => {
        concat_idents!(to_t = to, _, $ty {
            /// Returns the value truncated to the bit size of the type.
            ///
            /// Signed types see the truncated bits as two's complement,
            /// wider types get the value sign extended (signed) or 0 extended (unsigned).
            pub fn to_t(&self) -> $ty {
                if <$ty>::MIN == 0 {
                    self.bits as $ty
                } else {
                    self.signed() as $ty
                }
            }
        });
    };
}

/// Fixed width bit vector carried by ports.
///
/// The width never changes after construction and the bits above it are always 0.
///
/// # Example
/// ```
/// # use rtlsim::SignalValue;
/// let v = SignalValue::new(4, 0b1111);
///
/// assert_eq!(v.unsigned(), 15);
/// assert_eq!(v.signed(), -1);
/// assert_eq!(v.as_bool(), true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalValue {
    width: u32,
    bits: u64,
}

impl SignalValue {
    /// Returns a new [SignalValue] of `width` bits holding the low `width` bits of `bits`.
    ///
    /// # Panics
    ///
    /// Will panic if `width` is not in `1..=64`.
    pub fn new(width: u32, bits: u64) -> Self {
        assert!(
            (1..=MAX_WIDTH).contains(&width),
            "signal width must be in 1..=64, got {}",
            width
        );
        Self {
            width,
            bits: bits & Self::mask(width),
        }
    }

    /// Returns a [SignalValue] of `width` bits, all of them 0.
    pub fn zero(width: u32) -> Self {
        Self::new(width, 0)
    }

    /// Returns the mask covering the low `width` bits.
    pub fn mask(width: u32) -> u64 {
        if width >= MAX_WIDTH {
            u64::MAX
        } else {
            (1 << width) - 1
        }
    }

    /// Returns the number of bits of the value.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bits as an unsigned integer.
    pub fn unsigned(&self) -> u64 {
        self.bits
    }

    /// Returns the bits as a two's complement integer, sign extended from bit `width - 1`.
    pub fn signed(&self) -> i64 {
        let shift = MAX_WIDTH - self.width;
        ((self.bits << shift) as i64) >> shift
    }

    /// Returns bit 0.
    pub fn as_bool(&self) -> bool {
        self.bit(0)
    }

    /// Returns bit `n`, bits at or above the width are 0.
    pub fn bit(&self, n: u32) -> bool {
        n < self.width && (self.bits >> n) & 1 == 1
    }

    value_views!(u8, i8, u16, i16, u32, i32, u64, i64);
}

impl Display for SignalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ValueDisplayFormat::Unsigned.format(*self))
    }
}

impl From<SignalValue> for u64 {
    fn from(v: SignalValue) -> Self {
        v.unsigned()
    }
}

/// Radix an observer chose to show a port's value in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ValueDisplayFormat {
    Binary,
    Hex,
    Unsigned,
    Signed,
}

impl Default for ValueDisplayFormat {
    fn default() -> Self {
        ValueDisplayFormat::Unsigned
    }
}

impl ValueDisplayFormat {
    /// Renders `value` in this radix, binary and hex are padded to the value's width.
    ///
    /// # Example
    /// ```
    /// # use rtlsim::{SignalValue, ValueDisplayFormat};
    /// let v = SignalValue::new(8, 0xf3);
    ///
    /// assert_eq!(ValueDisplayFormat::Binary.format(v), "0b11110011");
    /// assert_eq!(ValueDisplayFormat::Hex.format(v), "0xf3");
    /// assert_eq!(ValueDisplayFormat::Signed.format(v), "-13");
    /// ```
    pub fn format(self, value: SignalValue) -> String {
        let width = value.width() as usize;
        match self {
            ValueDisplayFormat::Binary => format!("0b{:0w$b}", value.unsigned(), w = width),
            ValueDisplayFormat::Hex => {
                format!("0x{:0w$x}", value.unsigned(), w = num_integer::div_ceil(width, 4))
            }
            ValueDisplayFormat::Unsigned => value.unsigned().to_string(),
            ValueDisplayFormat::Signed => value.signed().to_string(),
        }
    }
}
