/// Moderation workflow
///
/// Admin gating and the post approval pipeline: drafts are snapshotted
/// into a pending queue at submission and only become published content
/// through a super admin decision.

pub mod draft;
pub mod engine;
pub mod queue;

pub use draft::{DraftContent, InternshipDraft, JobDraft, PostType};
pub use engine::{AdminApproval, Decision, ModerationEngine};
pub use queue::{PendingPost, PendingQueue};
