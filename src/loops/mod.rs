/// GIF decoding into [`model::Loop`]s.
pub mod decode;
/// The in-memory loop model.
pub mod model;
