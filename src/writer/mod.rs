pub mod asm;
pub mod symbols;
