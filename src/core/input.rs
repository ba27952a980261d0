use super::models::{DocumentBlob, JobDescriptionSource, SubmissionInput};

#[derive(Debug, Default)]
pub struct InputCollector {
    input: SubmissionInput,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_resume(&mut self, resume: DocumentBlob) {
        self.input.resume = Some(resume);
    }

    pub fn clear_resume(&mut self) {
        self.input.resume = None;
    }

    pub fn select_job_description_file(&mut self, file: DocumentBlob) {
        self.input.job_description = Some(JobDescriptionSource::File(file));
    }

    pub fn clear_job_description_file(&mut self) {
        if self.input.job_description_file().is_some() {
            self.input.job_description = None;
        }
    }

    // Any edit drops a chosen file; "" means the box was cleared.
    pub fn enter_job_description_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.input.job_description = if text.is_empty() {
            None
        } else {
            Some(JobDescriptionSource::Text(text))
        };
    }

    pub fn input(&self) -> &SubmissionInput {
        &self.input
    }

    pub fn snapshot(&self) -> SubmissionInput {
        self.input.clone()
    }

    pub fn reset(&mut self) {
        self.input = SubmissionInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str) -> DocumentBlob {
        DocumentBlob::new(name, b"%PDF-1.4".to_vec())
    }

    #[test]
    fn text_after_file_clears_file() {
        let mut collector = InputCollector::new();
        collector.select_job_description_file(blob("jd.pdf"));
        collector.enter_job_description_text("Senior Go Engineer");

        assert!(collector.input().job_description_file().is_none());
        assert_eq!(
            collector.input().job_description_text(),
            Some("Senior Go Engineer")
        );
    }

    #[test]
    fn file_after_text_clears_text() {
        let mut collector = InputCollector::new();
        collector.enter_job_description_text("Senior Go Engineer");
        collector.select_job_description_file(blob("jd.docx"));

        assert!(collector.input().job_description_text().is_none());
        assert_eq!(
            collector
                .input()
                .job_description_file()
                .map(|f| f.file_name.as_str()),
            Some("jd.docx")
        );
    }

    #[test]
    fn alternating_modes_never_hold_both() {
        let mut collector = InputCollector::new();
        for round in 0..6 {
            if round % 2 == 0 {
                collector.select_job_description_file(blob("jd.txt"));
            } else {
                collector.enter_job_description_text(format!("round {round}"));
            }

            let input = collector.input();
            assert!(
                !(input.job_description_file().is_some()
                    && input.job_description_text().is_some())
            );
        }
    }

    #[test]
    fn clearing_text_box_leaves_no_job_description() {
        let mut collector = InputCollector::new();
        collector.select_job_description_file(blob("jd.pdf"));
        collector.enter_job_description_text("");

        assert!(collector.input().job_description.is_none());
    }

    #[test]
    fn clear_file_keeps_pasted_text() {
        let mut collector = InputCollector::new();
        collector.enter_job_description_text("Data Engineer");
        collector.clear_job_description_file();

        assert_eq!(collector.input().job_description_text(), Some("Data Engineer"));
    }

    #[test]
    fn reset_drops_everything() {
        let mut collector = InputCollector::new();
        collector.select_resume(blob("cv.pdf"));
        collector.enter_job_description_text("Data Engineer");
        collector.reset();

        assert_eq!(collector.snapshot(), SubmissionInput::default());
    }
}
