//! Conversion of raw attribute values into their typed form.

use crate::catalog::MaxOccurs;

pub(crate) trait ActualValue: Sized {
    fn convert(src: &str) -> Option<Self>;
}

impl ActualValue for bool {
    fn convert(src: &str) -> Option<Self> {
        match src.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ActualValue for u32 {
    fn convert(src: &str) -> Option<Self> {
        src.trim().parse().ok()
    }
}

impl ActualValue for MaxOccurs {
    fn convert(src: &str) -> Option<Self> {
        match src.trim() {
            "unbounded" => Some(MaxOccurs::Unbounded),
            count => count.parse().ok().map(MaxOccurs::Count),
        }
    }
}

pub(crate) fn actual_value<T: ActualValue>(src: &str) -> Option<T> {
    T::convert(src)
}
