pub mod acquisition;
pub mod entities;
pub mod normalization;
pub mod guardrail;
pub mod department;
pub mod processor;
