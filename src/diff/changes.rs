//! Flat, sortable, paginated list of every change in a [`DiffResult`].

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{AttributeChange, ChangeKind, DiffResult};

/// One row of the change list.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRow {
	pub id: String,
	pub name: Option<String>,
	pub kind: String,
	pub change: ChangeKind,
	/// Only populated for [`ChangeKind::Changed`].
	pub attributes: IndexMap<String, AttributeChange>,
}

impl ChangeRow {
	/// Text for the row's highlight action.
	pub fn title(&self) -> &str {
		self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
	}
}

/// Builds one row per id; duplicate ids keep the best-precedence category.
pub fn change_rows(diff: &DiffResult) -> Vec<ChangeRow> {
	let mut kinds = ChangeKind::ALL;
	kinds.sort_by_key(|k| k.precedence());

	let mut seen = HashSet::new();
	let mut rows = Vec::with_capacity(diff.len());
	for kind in kinds {
		let entries: Vec<ChangeRow> = match kind {
			ChangeKind::Changed => diff
				.changed
				.values()
				.map(|c| ChangeRow {
					id: c.id.clone(),
					name: c.name.clone(),
					kind: c.kind.clone(),
					change: kind,
					attributes: c.attrs.clone(),
				})
				.collect(),
			_ => {
				let map = match kind {
					ChangeKind::Added => &diff.added,
					ChangeKind::Removed => &diff.removed,
					_ => &diff.layout_changed,
				};
				map.values()
					.map(|e| ChangeRow {
						id: e.id.clone(),
						name: e.name.clone(),
						kind: e.kind.clone(),
						change: kind,
						attributes: IndexMap::new(),
					})
					.collect()
			}
		};
		for row in entries {
			if seen.insert(row.id.clone()) {
				rows.push(row);
			}
		}
	}
	rows
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
	Change,
	Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
	Ascending,
	Descending,
}

/// Change list state: rows, current sort and current page.
#[derive(Clone, Debug)]
pub struct ChangeList {
	rows: Vec<ChangeRow>,
	page_size: usize,
	page_index: usize,
	sort: (SortColumn, SortDirection),
}

impl ChangeList {
	/// Rows sorted by change label, descending.
	pub fn new(diff: &DiffResult, page_size: usize) -> Self {
		let mut list = Self {
			rows: change_rows(diff),
			page_size: page_size.max(1),
			page_index: 0,
			sort: (SortColumn::Change, SortDirection::Descending),
		};
		list.sort_by(SortColumn::Change, SortDirection::Descending);
		list
	}

	/// Stable alphanumeric sort on the column's text; resets to the first page.
	pub fn sort_by(&mut self, column: SortColumn, direction: SortDirection) {
		let key = |row: &ChangeRow| -> String {
			match column {
				SortColumn::Change => row.change.label().to_string(),
				SortColumn::Type => row.kind.clone(),
			}
		};
		self.rows.sort_by(|a, b| {
			let ord = key(a).cmp(&key(b));
			match direction {
				SortDirection::Ascending => ord,
				SortDirection::Descending => ord.reverse(),
			}
		});
		self.sort = (column, direction);
		self.page_index = 0;
	}

	/// Flips the direction when sorting by the current column again.
	pub fn toggle_sort(&mut self, column: SortColumn) {
		let direction = match self.sort {
			(current, SortDirection::Descending) if current == column => SortDirection::Ascending,
			(current, SortDirection::Ascending) if current == column => SortDirection::Descending,
			_ => SortDirection::Descending,
		};
		self.sort_by(column, direction);
	}

	pub fn sort(&self) -> (SortColumn, SortDirection) {
		self.sort
	}

	pub fn total(&self) -> usize {
		self.rows.len()
	}

	pub fn page_count(&self) -> usize {
		self.rows.len().div_ceil(self.page_size).max(1)
	}

	pub fn page_index(&self) -> usize {
		self.page_index
	}

	/// Moves to `index`, clamped to the last page.
	pub fn set_page(&mut self, index: usize) {
		self.page_index = index.min(self.page_count() - 1);
	}

	/// Rows on the current page.
	pub fn page(&self) -> &[ChangeRow] {
		let start = (self.page_index * self.page_size).min(self.rows.len());
		let end = (start + self.page_size).min(self.rows.len());
		&self.rows[start..end]
	}
}
