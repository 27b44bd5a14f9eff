//! Definiciones relacionadas a Steps.
//!
//! Un step es una unidad de trabajo opaca identificada por un id estable
//! dentro del flujo. La lógica de cada step vive en el wizard que lo
//! registra; el motor sólo conoce el id y un hook opcional de entrada
//! (usado para los auto-saltos condicionales).

pub mod definition;

pub use definition::{EnterHook, StepDefinition, StepRegistry, StepRegistryBuilder};
