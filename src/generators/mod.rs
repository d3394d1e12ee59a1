mod common;

#[cfg(feature = "generator-cpp")]
mod cpp;
#[cfg(feature = "generator-rust")]
mod rust;

#[cfg(not(any(feature = "generator-cpp", feature = "generator-rust")))]
compile_error!("At least one generator must be enabled");

use clap::ValueEnum;

pub use common::{EmitContext, OutputFile};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-cpp")]
    Cpp,
    #[cfg(feature = "generator-rust")]
    Rust,
}

impl Default for Generator {
    #[cfg(feature = "generator-cpp")]
    fn default() -> Self {
        Self::Cpp
    }

    #[cfg(not(feature = "generator-cpp"))]
    fn default() -> Self {
        Self::Rust
    }
}

impl Generator {
    pub fn generate(&self, ctx: &EmitContext) -> Result<Vec<OutputFile>, std::fmt::Error> {
        match *self {
            #[cfg(feature = "generator-cpp")]
            Self::Cpp => cpp::generate(ctx),
            #[cfg(feature = "generator-rust")]
            Self::Rust => Ok(rust::generate(ctx)),
        }
    }
}
