use crate::{AttemptId, JobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Subscribe to the progress stream for an attempt.
    OpenChannel { attempt: AttemptId },
    /// Tear down the progress stream of a superseded attempt.
    CloseChannel { attempt: AttemptId },
    /// Post the job request.
    SubmitJob {
        attempt: AttemptId,
        request: JobRequest,
    },
    /// Abandon the in-flight job request of a superseded attempt.
    CancelSubmission { attempt: AttemptId },
    /// Fetch and save the result file produced by `attempt`.
    Download { attempt: AttemptId },
}
