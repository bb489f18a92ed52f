use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ordered_float::OrderedFloat;

/// Named argument values supplied to `format` and `format_to_parts`.
pub type Params = HashMap<String, ParamValue>;

/// Builds a [`Params`] bag.
///
/// ```
/// use message_format::params;
///
/// let params = params! { "name" => "foo", "count" => 3 };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert(::std::string::String::from($name), $crate::ParamValue::from($value));)+
        params
    }};
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamValue {
    inner: ParamValueInner,
}

impl From<ParamValueInner> for ParamValue {
    fn from(inner: ParamValueInner) -> Self {
        Self { inner }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ParamValueInner {
    Int(i64),
    Dec(OrderedFloat<f64>),
    String(String),
    Bool(bool),
    Null,
    /// Milliseconds since the Unix epoch.
    Date(i64),
    Rich(RichValue),
}

/// Caller-owned value that is not a scalar, e.g. a UI element.
///
/// Equality and hashing go by identity, so a value read back from a
/// [`Part::Argument`](crate::Part::Argument) can be matched against the
/// original with `==`.
#[derive(Clone)]
pub struct RichValue(Arc<dyn Any + Send + Sync>);

impl RichValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for RichValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for RichValue {}

impl Hash for RichValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for RichValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RichValue({:#x})", self.addr())
    }
}

impl ParamValue {
    pub fn null() -> Self {
        ParamValueInner::Null.into()
    }

    /// A point in time given as milliseconds since the Unix epoch (UTC).
    pub fn date(epoch_millis: i64) -> Self {
        ParamValueInner::Date(epoch_millis).into()
    }

    pub fn rich<T: Any + Send + Sync>(value: T) -> Self {
        ParamValueInner::Rich(RichValue::new(value)).into()
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match &self.inner {
            ParamValueInner::Int(n) => Some(*n as f64),
            ParamValueInner::Dec(x) => Some(x.0),
            ParamValueInner::String(s) => s.trim().parse().ok(),
            ParamValueInner::Bool(_)
            | ParamValueInner::Null
            | ParamValueInner::Date(_)
            | ParamValueInner::Rich(_) => None,
        }
    }

    /// Epoch milliseconds for date and time placeholders. Numbers are read as
    /// epoch milliseconds as well.
    pub fn as_epoch_millis(&self) -> Option<i64> {
        match &self.inner {
            ParamValueInner::Date(ms) | ParamValueInner::Int(ms) => Some(*ms),
            ParamValueInner::Dec(x) if x.0.is_finite() => Some(x.0.trunc() as i64),
            ParamValueInner::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_rich(&self) -> Option<&RichValue> {
        match &self.inner {
            ParamValueInner::Rich(rich) => Some(rich),
            _ => None,
        }
    }

    /// `null` and `false` render as nothing.
    pub fn is_blank(&self) -> bool {
        matches!(
            self.inner,
            ParamValueInner::Null | ParamValueInner::Bool(false)
        )
    }

    pub fn is_date(&self) -> bool {
        matches!(self.inner, ParamValueInner::Date(_))
    }

    /// Key used to pick a `select` branch.
    pub fn select_key(&self) -> Option<String> {
        match &self.inner {
            ParamValueInner::Null => Some("null".to_owned()),
            ParamValueInner::Rich(_) => None,
            _ => Some(self.to_string()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValueInner::Dec(OrderedFloat(value)).into()
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        f64::from(value).into()
    }
}

macro_rules! impl_from_integer_type {
    ($itype:ident) => {
        impl From<$itype> for ParamValue {
            fn from(value: $itype) -> Self {
                ParamValueInner::Int(value.into()).into()
            }
        }
    };
}

impl_from_integer_type!(i64);
impl_from_integer_type!(i32);
impl_from_integer_type!(i16);
impl_from_integer_type!(i8);
impl_from_integer_type!(u32);
impl_from_integer_type!(u16);
impl_from_integer_type!(u8);

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValueInner::String(value).into()
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValueInner::Bool(value).into()
    }
}

impl From<RichValue> for ParamValue {
    fn from(value: RichValue) -> Self {
        ParamValueInner::Rich(value).into()
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ParamValueInner::Int(value) => write!(f, "{}", value),
            ParamValueInner::Dec(value) => write!(f, "{}", value),
            ParamValueInner::String(value) => f.write_str(value),
            ParamValueInner::Bool(value) => write!(f, "{}", value),
            ParamValueInner::Null => Ok(()),
            ParamValueInner::Date(value) => write!(f, "{}", value),
            ParamValueInner::Rich(value) => write!(f, "{:?}", value),
        }
    }
}
