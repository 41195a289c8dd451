// Segment store - Ordered in/out intervals over a fixed video duration

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::utils::time::format_time;

/// In-memory segment collection for the loaded video
///
/// The sequence is kept sorted ascending by `start` after every mutation.
/// Overlapping segments are allowed and are passed through untouched.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    duration: f64,
    segments: Vec<Segment>,
    next_id: SegmentId,
}

impl SegmentStore {
    /// Create an empty store for a video of `duration` seconds
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            segments: Vec::new(),
            next_id: 1,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Validate and insert a segment, returning its stable id
    ///
    /// On error the store is left unchanged.
    pub fn add(&mut self, start: f64, end: f64) -> Result<SegmentId, DomainError> {
        self.validate(start, end)?;

        let id = self.next_id;
        self.next_id += 1;
        self.segments.push(Segment { id, start, end });
        self.sort();

        debug!(id, start, end, count = self.segments.len(), "Segment added");
        Ok(id)
    }

    /// Remove the segment at `index` of the current sorted view
    ///
    /// Legacy positional removal: an index outside the view is a silent no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<Segment> {
        if index >= self.segments.len() {
            debug!(index, count = self.segments.len(), "Ignoring out-of-range segment index");
            return None;
        }
        Some(self.segments.remove(index))
    }

    /// Remove a segment by id; unknown ids are a no-op
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let index = self.segments.iter().position(|segment| segment.id == id)?;
        Some(self.segments.remove(index))
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Segments ordered ascending by start
    pub fn sorted_view(&self) -> &[Segment] {
        &self.segments
    }

    /// Sorted `{start, end}` pairs, as sent to the backend
    pub fn serialize(&self) -> Vec<SegmentBounds> {
        self.segments.iter().map(Segment::bounds).collect()
    }

    /// Numbered display rows for the sorted view
    pub fn rows(&self) -> Vec<SegmentRow> {
        self.segments
            .iter()
            .enumerate()
            .map(|(index, segment)| SegmentRow {
                id: segment.id,
                number: index + 1,
                start_label: format_time(segment.start),
                end_label: format_time(segment.end),
                duration_label: format_time(segment.duration()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of segment lengths, overlaps counted twice
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    fn validate(&self, start: f64, end: f64) -> Result<(), DomainError> {
        if start.is_nan() || end.is_nan() {
            return Err(DomainError::Validation(
                "Please enter valid start and end times".to_string(),
            ));
        }
        if start >= end {
            return Err(DomainError::Validation(
                "Start time must be less than end time".to_string(),
            ));
        }
        if !self.duration.is_finite() {
            return Err(DomainError::Validation(
                "Video duration is not available".to_string(),
            ));
        }
        if start < 0.0 || end > self.duration {
            return Err(DomainError::Validation(
                "Times must be within video duration".to_string(),
            ));
        }
        Ok(())
    }

    fn sort(&mut self) {
        // stable, so equal starts keep insertion order
        self.segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    }
}
