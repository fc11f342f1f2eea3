// Preview assembly for the editor sandbox: fix-up rules for generated HTML,
// the injected selection-bridge script, and the typed message contract.
// Everything here operates on an outgoing copy; stored Versions are never
// modified.

pub mod bridge;
pub mod fixup;
pub mod handlers;
pub mod script;
