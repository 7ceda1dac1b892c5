//! "All changes" dialog: a sortable, paginated table of every change.

use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::diff::changes::{ChangeList, ChangeRow, SortColumn, SortDirection};
use crate::model::AttrValue;

fn display(value: Option<&AttrValue>) -> String {
	value.map(AttrValue::display_text).unwrap_or_default()
}

/// Button opening the dialog; `on_select` receives the id of a picked row.
#[component]
pub fn ChangeListDialog(list: ChangeList, on_select: Callback<String>) -> impl IntoView {
	let total = list.total();
	let list = RwSignal::new(list);
	let open = RwSignal::new(false);
	let select = Callback::new(move |id: String| {
		open.set(false);
		on_select.run(id);
	});

	view! {
		<button type="button" class="btn btn-sm" on:click=move |_| open.set(true)>
			{format!("All changes ({total})")}
		</button>
		{move || {
			open.get()
				.then(|| {
					view! {
						<div class="mdv-dialog-backdrop" on:click=move |_| open.set(false)></div>
						<div class="mdv-dialog" role="dialog" aria-labelledby="mdv-dialog-header">
							<div class="mdv-dialog-header">
								<h3 id="mdv-dialog-header">"All changes"</h3>
								<button
									type="button"
									class="btn-octicon"
									aria-label="Close"
									on:click=move |_| open.set(false)
								>
									"\u{00D7}"
								</button>
							</div>
							<ChangeTable list on_select=select />
						</div>
					}
				})
		}}
	}
}

#[component]
fn ChangeTable(list: RwSignal<ChangeList>, on_select: Callback<String>) -> impl IntoView {
	let header = move |column: SortColumn, label: &'static str| {
		let arrow = move || {
			list.with(|l| match l.sort() {
				(c, SortDirection::Ascending) if c == column => " \u{25B2}",
				(c, SortDirection::Descending) if c == column => " \u{25BC}",
				_ => "",
			})
		};
		view! {
			<th class="mdv-sortable" on:click=move |_| list.update(|l| l.toggle_sort(column))>
				{label}
				{arrow}
			</th>
		}
	};

	let rows = move || {
		list.with(|l| l.page().to_vec())
			.into_iter()
			.map(|row| view! { <ChangeRowView row on_select /> })
			.collect_view()
	};

	view! {
		<table class="mdv-changes">
			<thead>
				<tr>
					<th>"ID"</th>
					<th>"Name"</th>
					{header(SortColumn::Type, "Type")}
					{header(SortColumn::Change, "Change")}
					<th></th>
				</tr>
			</thead>
			<tbody>{rows}</tbody>
		</table>
		<div class="mdv-pager">
			<button
				type="button"
				class="btn btn-sm"
				disabled=move || list.with(|l| l.page_index() == 0)
				on:click=move |_| list.update(|l| l.set_page(l.page_index().saturating_sub(1)))
			>
				"Previous"
			</button>
			<span>
				{move || list.with(|l| format!("Page {} of {}", l.page_index() + 1, l.page_count()))}
			</span>
			<button
				type="button"
				class="btn btn-sm"
				disabled=move || list.with(|l| l.page_index() + 1 >= l.page_count())
				on:click=move |_| list.update(|l| l.set_page(l.page_index() + 1))
			>
				"Next"
			</button>
		</div>
	}
}

#[component]
fn ChangeRowView(row: ChangeRow, on_select: Callback<String>) -> impl IntoView {
	let attributes = (!row.attributes.is_empty()).then(|| {
		let items = row
			.attributes
			.iter()
			.map(|(name, change)| {
				let (old, new) = (
					display(change.old_value.as_ref()),
					display(change.new_value.as_ref()),
				);
				view! {
					<li>
						<code>{name.clone()}</code>
						": "
						<del>{old}</del>
						" \u{2192} "
						<ins>{new}</ins>
					</li>
				}
			})
			.collect_view();
		view! { <ul class="mdv-attrs">{items}</ul> }
	});
	let kind = row.kind.rsplit(':').next().unwrap_or(&row.kind).to_string();
	let title = row.title().to_string();
	let id = row.id.clone();
	let reveal = move |ev: MouseEvent| {
		ev.prevent_default();
		on_select.run(id.clone());
	};

	view! {
		<tr>
			<td><code>{row.id}</code></td>
			<td>{row.name.unwrap_or_default()} {attributes}</td>
			<td>{kind}</td>
			<td>
				<span class=format!("mdv-badge {}", row.change.marker_class())>
					{row.change.glyph()}
					" "
					{row.change.label()}
				</span>
			</td>
			<td>
				<button type="button" class="btn-octicon" title=format!("Show {title}") on:click=reveal>
					"\u{1F50D}"
				</button>
			</td>
		</tr>
	}
}
