/// Constructor and `&str` access for the crate's `String` newtypes.
#[macro_export]
macro_rules! text_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
