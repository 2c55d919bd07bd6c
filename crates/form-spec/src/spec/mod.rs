pub mod concept;
pub mod element;
pub mod form;
pub mod group;

pub use concept::{Concept, ConceptAnswer, Datatype};
pub use element::{ElementType, FieldKind, FormElement};
pub use form::Form;
pub use group::FormElementGroup;
