use nt_core::filter::{format_date, parse_date_field};
use nt_core::{DateField, FilterCriteria, Sentiment, SortOrder, ValidationError};

use crate::filter_state::FilterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Query,
    Source,
    Sentiment,
    Sort,
    DateFrom,
    DateTo,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Query,
        FormField::Source,
        FormField::Sentiment,
        FormField::Sort,
        FormField::DateFrom,
        FormField::DateTo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Query => "Search",
            FormField::Source => "Source",
            FormField::Sentiment => "Sentiment",
            FormField::Sort => "Sort",
            FormField::DateFrom => "From",
            FormField::DateTo => "To",
        }
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, FormField::Sentiment | FormField::Sort)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<DateField> for FormField {
    fn from(field: DateField) -> Self {
        match field {
            DateField::From => FormField::DateFrom,
            DateField::To => FormField::DateTo,
        }
    }
}

/// Form contents as typed. Dates stay text until submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterDraft {
    pub query: String,
    pub source: String,
    pub sentiment: Sentiment,
    pub sort: SortOrder,
    pub date_from: String,
    pub date_to: String,
}

impl FilterDraft {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            query: criteria.query.clone(),
            source: criteria.source.clone(),
            sentiment: criteria.sentiment,
            sort: criteria.sort,
            date_from: criteria.date_from.map(format_date).unwrap_or_default(),
            date_to: criteria.date_to.map(format_date).unwrap_or_default(),
        }
    }

    pub fn to_criteria(&self) -> Result<FilterCriteria, ValidationError> {
        let criteria = FilterCriteria {
            query: self.query.clone(),
            sentiment: self.sentiment,
            source: self.source.clone(),
            date_from: parse_date_field(DateField::From, &self.date_from)?,
            date_to: parse_date_field(DateField::To, &self.date_to)?,
            sort: self.sort,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Query => Some(&mut self.query),
            FormField::Source => Some(&mut self.source),
            FormField::DateFrom => Some(&mut self.date_from),
            FormField::DateTo => Some(&mut self.date_to),
            FormField::Sentiment | FormField::Sort => None,
        }
    }

    /// Display value of a field.
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Query => self.query.clone(),
            FormField::Source => self.source.clone(),
            FormField::Sentiment => self.sentiment.label().to_string(),
            FormField::Sort => self.sort.label().to_string(),
            FormField::DateFrom => self.date_from.clone(),
            FormField::DateTo => self.date_to.clone(),
        }
    }
}

/// Editable filter form. Edits stay in the draft until [`submit`] hands the
/// whole draft to the commit callback.
///
/// [`submit`]: FilterFormController::submit
#[derive(Debug, Clone)]
pub struct FilterFormController {
    draft: FilterDraft,
    focus: FormField,
    error: Option<(FormField, ValidationError)>,
    synced_revision: u64,
}

impl FilterFormController {
    pub fn new(state: &FilterState) -> Self {
        Self {
            draft: FilterDraft::from_criteria(state.criteria()),
            focus: FormField::Query,
            error: None,
            synced_revision: state.external_revision(),
        }
    }

    pub fn draft(&self) -> &FilterDraft {
        &self.draft
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_focus(&mut self, field: FormField) {
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// The field-level error from the last rejected submission.
    pub fn field_error(&self) -> Option<(FormField, String)> {
        self.error.as_ref().map(|(field, e)| (*field, e.to_string()))
    }

    pub fn set_query(&mut self, value: &str) {
        self.set_text(FormField::Query, value);
    }

    pub fn set_source(&mut self, value: &str) {
        self.set_text(FormField::Source, value);
    }

    pub fn set_date_from(&mut self, value: &str) {
        self.set_text(FormField::DateFrom, value);
    }

    pub fn set_date_to(&mut self, value: &str) {
        self.set_text(FormField::DateTo, value);
    }

    pub fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.draft.sentiment = sentiment;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.draft.sort = sort;
    }

    fn set_text(&mut self, field: FormField, value: &str) {
        if let Some(text) = self.draft.text_mut(field) {
            *text = value.to_string();
            self.clear_error_for(field);
        }
    }

    /// Types a character into the focused text field.
    pub fn input_char(&mut self, c: char) {
        let field = self.focus;
        if let Some(text) = self.draft.text_mut(field) {
            text.push(c);
            self.clear_error_for(field);
        }
    }

    /// Deletes the last character of the focused text field. Returns false if
    /// there was nothing to delete.
    pub fn backspace(&mut self) -> bool {
        let field = self.focus;
        let removed = self.draft.text_mut(field).and_then(|text| text.pop()).is_some();
        if removed {
            self.clear_error_for(field);
        }
        removed
    }

    /// Steps the focused choice field forwards or backwards.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Sentiment => self.draft.sentiment = step(&Sentiment::ALL, self.draft.sentiment, forward),
            FormField::Sort => self.draft.sort = step(&SortOrder::ALL, self.draft.sort, forward),
            _ => {}
        }
    }

    pub fn reset(&mut self) {
        self.draft = FilterDraft::default();
        self.error = None;
    }

    /// Validates the draft and, if it is acceptable, passes the complete
    /// criteria to `commit`. A rejected draft records a field error and never
    /// calls `commit`.
    pub fn submit<F>(&mut self, commit: F) -> Result<(), ValidationError>
    where
        F: FnOnce(FilterCriteria),
    {
        match self.draft.to_criteria() {
            Ok(criteria) => {
                self.error = None;
                commit(criteria);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Filter submission rejected: {}", e);
                self.error = Some((e.field().into(), e.clone()));
                Err(e)
            }
        }
    }

    /// Submits straight into a [`FilterState`]. Returns whether the active
    /// filter changed.
    pub fn submit_to(&mut self, state: &mut FilterState) -> Result<bool, ValidationError> {
        let mut changed = false;
        self.submit(|criteria| changed = state.commit(criteria))?;
        Ok(changed)
    }

    /// Re-reads the draft when the active filter changed outside the form.
    pub fn sync_from(&mut self, state: &FilterState) -> bool {
        if state.external_revision() == self.synced_revision {
            return false;
        }
        self.synced_revision = state.external_revision();
        self.draft = FilterDraft::from_criteria(state.criteria());
        self.error = None;
        true
    }

    fn clear_error_for(&mut self, field: FormField) {
        if matches!(self.error, Some((f, _)) if f == field) {
            self.error = None;
        }
    }
}

fn step<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let len = options.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    options[next]
}
