use crate::trail::{AssessmentState, LearningTrail};

use super::learning_response::LearningResponse;

/// Page-level result reported to the host once a learner has answered
/// something on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAssessmentStatus {
    Pass,
    Fail,
}

/// Where page status is recorded. A `None` status means the learner has not
/// interacted since the page was last reset.
pub trait PageStatusRecorder {
    fn status(&self) -> Option<PageAssessmentStatus>;
    fn set_status(&mut self, status: PageAssessmentStatus);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPageStatus {
    status: Option<PageAssessmentStatus>,
    writes: usize,
}

impl MemoryPageStatus {
    /// Number of `set_status` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn reset(&mut self) {
        self.status = None;
    }
}

impl PageStatusRecorder for MemoryPageStatus {
    fn status(&self) -> Option<PageAssessmentStatus> {
        self.status
    }

    fn set_status(&mut self, status: PageAssessmentStatus) {
        self.status = Some(status);
        self.writes += 1;
    }
}

pub struct LearningAssessmentManager<R: PageStatusRecorder> {
    recorder: R,
}

impl<R: PageStatusRecorder> LearningAssessmentManager<R> {
    pub fn new(recorder: R) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    /// Folds a submitted response into its step, then reports the trail's
    /// rolled-up result as the page status.
    ///
    /// Pass is written only when not already recorded. Anything short of a
    /// fully successful trail records fail, so the status is always set once
    /// a response has been submitted.
    pub fn update_assessment_state_for(
        &mut self,
        trail: &mut LearningTrail,
        step_index: usize,
        response: &LearningResponse,
    ) {
        let Some(step) = trail.steps.get_mut(step_index) else {
            log::warn!("no step {step_index} in {}", trail.identifier);
            return;
        };
        step.record_response(response);
        log::debug!(
            "step {} of {} is now {:?}",
            step.identifier,
            trail.identifier,
            step.assessment_state
        );

        if trail.assessment_state() == AssessmentState::CompletedSuccessfully {
            if self.recorder.status() != Some(PageAssessmentStatus::Pass) {
                log::info!("{} completed successfully", trail.identifier);
                self.recorder.set_status(PageAssessmentStatus::Pass);
            }
        } else {
            self.recorder.set_status(PageAssessmentStatus::Fail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::response::ResponseType;
    use pretty_assertions::assert_eq;

    const TRAIL: &str = r#"<trail name="quiz">
        <step name="one" type="check">
            <assessment/>
            <blocks>
                <block type="response" name="q1"><option type="correct">yes</option><option>no</option></block>
            </blocks>
        </step>
        <step name="two" type="check">
            <assessment/>
            <blocks>
                <block type="response" name="q2"><option type="correct">up</option><option>down</option></block>
            </blocks>
        </step>
    </trail>"#;

    fn response(step: usize, trail: &LearningTrail) -> LearningResponse {
        let step = &trail.steps[step];
        step.response_for(step.response_blocks()[0]).unwrap()
    }

    #[test]
    fn pass_is_recorded_once_all_steps_succeed() {
        let mut trail = LearningTrail::parse(TRAIL, &ParseOptions::default(), None).unwrap();
        let mut manager = LearningAssessmentManager::new(MemoryPageStatus::default());

        let mut first = response(0, &trail);
        first.select_option(0, true);
        manager.update_assessment_state_for(&mut trail, 0, &first);
        assert_eq!(trail.steps[0].assessment_state, AssessmentState::CompletedSuccessfully);
        assert_eq!(manager.recorder().status(), Some(PageAssessmentStatus::Fail));

        let mut second = response(1, &trail);
        second.select_option(0, true);
        manager.update_assessment_state_for(&mut trail, 1, &second);
        assert_eq!(trail.assessment_state(), AssessmentState::CompletedSuccessfully);
        assert_eq!(manager.recorder().status(), Some(PageAssessmentStatus::Pass));

        let writes = manager.recorder().writes();
        manager.update_assessment_state_for(&mut trail, 1, &second);
        assert_eq!(manager.recorder().writes(), writes);
    }

    #[test]
    fn wrong_answer_is_partial_and_fails_the_page() {
        let mut trail = LearningTrail::parse(TRAIL, &ParseOptions::default(), None).unwrap();
        let mut manager = LearningAssessmentManager::new(MemoryPageStatus::default());

        let mut first = response(0, &trail);
        first.select_option(1, true);
        manager.update_assessment_state_for(&mut trail, 0, &first);

        assert_eq!(trail.steps[0].assessment_state, AssessmentState::PartiallyCompleted);
        assert_eq!(trail.assessment_state(), AssessmentState::PartiallyCompleted);
        assert_eq!(manager.recorder().status(), Some(PageAssessmentStatus::Fail));
    }

    #[test]
    fn non_assessable_step_keeps_its_state() {
        let xml = r#"<trail name="t"><step name="s"><blocks>
            <block type="response"><option type="correct">a</option></block>
        </blocks></step></trail>"#;
        let mut trail = LearningTrail::parse(xml, &ParseOptions::default(), None).unwrap();
        let mut manager = LearningAssessmentManager::new(MemoryPageStatus::default());
        let mut answer =
            LearningResponse::parse("r", "<option type=\"correct\">a</option>", ResponseType::SingleChoice, false)
                .unwrap();
        answer.select_option(0, true);

        manager.update_assessment_state_for(&mut trail, 0, &answer);
        assert_eq!(trail.steps[0].assessment_state, AssessmentState::NotAssessable);
        assert_eq!(manager.into_recorder().status(), Some(PageAssessmentStatus::Fail));
    }
}
