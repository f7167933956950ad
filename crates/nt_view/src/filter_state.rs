use nt_core::{CriteriaKey, FilterCriteria};

/// The active filter and the shareable address it is mirrored to.
///
/// The address always holds the canonical encoding of the active criteria.
/// History grows by one entry per committed filter change, never per edit,
/// so going back lands on the previous filter.
#[derive(Debug, Clone)]
pub struct FilterState {
    criteria: FilterCriteria,
    address: String,
    history: Vec<String>,
    external_revision: u64,
}

impl FilterState {
    /// Mounts from an address. Malformed parts fall back to defaults.
    pub fn from_address(address: &str) -> Self {
        let criteria = FilterCriteria::decode(address);
        let address = criteria.encode();
        Self {
            criteria,
            address,
            history: Vec::new(),
            external_revision: 0,
        }
    }

    /// Promotes a submitted draft to the active filter. Returns false when
    /// the criteria encode to the address already shown.
    pub fn commit(&mut self, criteria: FilterCriteria) -> bool {
        if !self.replace(criteria) {
            return false;
        }
        tracing::info!("Filter committed: ?{}", self.address);
        true
    }

    /// Follows an address that did not come from the form, such as a shared
    /// link. The form picks the change up through the external revision.
    pub fn navigate(&mut self, address: &str) -> bool {
        if !self.replace(FilterCriteria::decode(address)) {
            return false;
        }
        self.external_revision += 1;
        tracing::info!("Navigated to ?{}", self.address);
        true
    }

    /// Returns to the previously committed filter.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.criteria = FilterCriteria::decode(&previous);
        self.address = previous;
        self.external_revision += 1;
        tracing::info!("Back to ?{}", self.address);
        true
    }

    fn replace(&mut self, criteria: FilterCriteria) -> bool {
        let address = criteria.encode();
        if address == self.address {
            return false;
        }
        let previous = std::mem::replace(&mut self.address, address);
        self.history.push(previous);
        self.criteria = criteria;
        true
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn key(&self) -> CriteriaKey {
        self.criteria.key()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Bumped on every change that did not originate from the form.
    pub fn external_revision(&self) -> u64 {
        self.external_revision
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::from_address("")
    }
}
