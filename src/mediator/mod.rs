// src/mediator/mod.rs
// =============================================================================
// Outbound-link mediation.
//
// Submodules:
// - classify: Internal / Trusted / Untrusted decision for one URL
// - codec: URL-safe base64 token carried in /go?u=...
// - rewrite: mediate() and the parameters the redirect page consumes
// - sweep: rewrites every anchor of a document through the AnchorTree trait
// - page: in-memory AnchorTree built from HTML or Markdown
//
// Nothing here holds shared state. A sweep only touches the tree handed to it
// and reads the (immutable) MediationConfig.
// =============================================================================

mod classify;
mod codec;
mod page;
mod rewrite;
mod sweep;

pub use classify::{classify, is_external, LinkClass};
pub use codec::{decode, encode};
pub use page::{Anchor, Page};
pub use rewrite::{mediate, redirect_page_url, RedirectParams, REDIRECT_PATH, TARGET_PARAM};
pub use sweep::{sweep, AnchorTree, Rewrite, SweepReport, EXTERNAL_REL, EXTERNAL_TARGET};
