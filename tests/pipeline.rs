//! End-to-end runs of the page pipeline against an in-memory forge, through
//! the same request envelope the extension contexts exchange.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::executor::block_on;
use model_diff_viewer::error::{Error, Result};
use model_diff_viewer::forge::{
	ChangeDescriptor, ChangeStatus, Commit, ContentFile, ContentRef, Forge, PullRequest, User,
};
use model_diff_viewer::page::{Navigation, PageKind, PagePlan, resolve_page};
use model_diff_viewer::preview::{FileIdentity, Notice, PreviewState, Side, load_preview};
use model_diff_viewer::session::MemoryCredentialStore;
use model_diff_viewer::transport::{Background, PullParams, Request, Transport};

#[derive(Default)]
struct Repo {
	files: HashMap<(String, String), String>,
	pull_files: Vec<ChangeDescriptor>,
	content_requests: RefCell<Vec<ContentRef>>,
}

/// Cheap handle, so the test keeps access after the session is built.
#[derive(Clone)]
struct FakeForge(Rc<Repo>);

impl Forge for FakeForge {
	async fn content(&self, at: &ContentRef) -> Result<ContentFile> {
		self.0.content_requests.borrow_mut().push(at.clone());
		Ok(ContentFile {
			content: self
				.0
				.files
				.get(&(at.reference.clone(), at.path.clone()))
				.map(|text| STANDARD.encode(text)),
			encoding: Some("base64".into()),
		})
	}

	async fn pull_files(&self, _: &str, _: &str, _: u64) -> Result<Vec<ChangeDescriptor>> {
		Ok(self.0.pull_files.clone())
	}

	async fn pull(&self, _: &str, _: &str, _: u64) -> Result<PullRequest> {
		Ok(PullRequest {
			head_sha: "head".into(),
			base_sha: "base".into(),
		})
	}

	async fn commit(&self, _: &str, _: &str, _: &str) -> Result<Commit> {
		Ok(Commit {
			files: self.0.pull_files.clone(),
			parent_shas: vec!["base".into()],
		})
	}

	async fn authenticated_user(&self) -> Result<User> {
		Ok(User {
			login: "octocat".into(),
		})
	}
}

fn bpmn(task_name: &str) -> String {
	format!(
		r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC" id="Definitions_1">
  <bpmn:process id="Process_1">
    <bpmn:startEvent id="Start_1" name="Start" />
    <bpmn:task id="Task_1" name="{task_name}" />
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start_1" targetRef="Task_1" />
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="Start_1_di" bpmnElement="Start_1"><dc:Bounds x="100" y="100" width="36" height="36" /></bpmndi:BPMNShape>
      <bpmndi:BPMNShape id="Task_1_di" bpmnElement="Task_1"><dc:Bounds x="200" y="78" width="100" height="80" /></bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#
	)
}

const DMN: &str = r#"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/" id="Definitions_1" name="Dish">
  <decision id="Decision_1" name="Dish">
    <decisionTable id="Table_1">
      <input id="Input_1"><inputExpression id="Expr_1" typeRef="string"><text>season</text></inputExpression></input>
      <output id="Output_1" name="dish" typeRef="string" />
    </decisionTable>
  </decision>
</definitions>"#;

fn repo() -> Repo {
	let mut files = HashMap::new();
	let mut put = |reference: &str, path: &str, text: String| {
		files.insert((reference.to_string(), path.to_string()), text);
	};
	put("base", "process.bpmn", bpmn("Check order"));
	put("head", "process.bpmn", bpmn("Review order"));
	put("head", "new.dmn", DMN.to_string());
	put("base", "broken.bpmn", "<bpmn:definitions".to_string());
	put("head", "broken.bpmn", bpmn("Check order"));
	Repo {
		files,
		pull_files: vec![
			ChangeDescriptor::new("process.bpmn", ChangeStatus::Modified),
			ChangeDescriptor::new("README.md", ChangeStatus::Modified),
			ChangeDescriptor::new("new.dmn", ChangeStatus::Added),
		],
		content_requests: RefCell::new(vec![]),
	}
}

type Extension = Background<FakeForge, MemoryCredentialStore, Box<dyn Fn(&str) -> Result<FakeForge>>>;

/// A background answering from `repo`, started with `store`.
fn extension(store: MemoryCredentialStore) -> (Extension, Rc<Repo>) {
	let repo = Rc::new(repo());
	let handle = FakeForge(repo.clone());
	let connect: Box<dyn Fn(&str) -> Result<FakeForge>> = Box::new(move |token: &str| match token {
		"valid" => Ok(handle.clone()),
		_ => Err(Error::Authentication("Bad credentials".into())),
	});
	let background = Background::new(store, connect);
	block_on(background.initialize());
	(background, repo)
}

fn identity(filename: &str, status: ChangeStatus) -> FileIdentity {
	FileIdentity {
		owner: "octo".into(),
		repo: "flows".into(),
		sha: "head".into(),
		parent_sha: "base".into(),
		file: ChangeDescriptor::new(filename, status),
	}
}

fn pull_page() -> PageKind {
	PageKind::Pull {
		owner: "octo".into(),
		repo: "flows".into(),
		pull: 12,
	}
}

#[test]
fn test_renamed_task_is_the_only_change() {
	let (background, repo) = extension(MemoryCredentialStore::with_token("valid"));
	let state = block_on(load_preview(
		&background,
		&identity("process.bpmn", ChangeStatus::Modified),
	));

	let PreviewState::Dual { diff, .. } = &state else {
		panic!("expected both sides, got {state:?}");
	};
	let diff = diff.as_ref().expect("diff");
	assert_eq!(diff.changed.keys().collect::<Vec<_>>(), ["Task_1"]);
	assert!(diff.added.is_empty());
	assert!(diff.removed.is_empty());
	assert!(diff.layout_changed.is_empty());

	let requests = repo.content_requests.borrow();
	assert_eq!(requests.len(), 2);
	assert!(requests.iter().any(|r| r.reference == "base"));
	assert!(requests.iter().any(|r| r.reference == "head"));
}

#[test]
fn test_added_file_renders_after_side_alone() {
	let (background, repo) = extension(MemoryCredentialStore::with_token("valid"));
	let state = block_on(load_preview(&background, &identity("new.dmn", ChangeStatus::Added)));

	match &state {
		PreviewState::Single { side, document } => {
			assert_eq!(*side, Side::After);
			assert!(document.get("Decision_1").is_some());
		}
		other => panic!("expected a single viewer, got {other:?}"),
	}
	assert!(state.diff().is_none());

	let requests = repo.content_requests.borrow();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].reference, "head");
}

#[test]
fn test_unparseable_side_falls_back_to_other() {
	let (background, _) = extension(MemoryCredentialStore::with_token("valid"));
	let state = block_on(load_preview(
		&background,
		&identity("broken.bpmn", ChangeStatus::Modified),
	));

	match &state {
		PreviewState::Single { side, document } => {
			assert_eq!(*side, Side::After);
			assert!(document.get("Task_1").is_some());
		}
		other => panic!("expected a single viewer, got {other:?}"),
	}
	assert!(state.diff().is_none());
}

#[test]
fn test_logged_out_page_fetches_no_diagram() {
	let (background, repo) = extension(MemoryCredentialStore::default());
	assert!(!background.is_authenticated());

	let response = block_on(background.send(Request::GetPullFiles(PullParams {
		owner: "octo".into(),
		repo: "flows".into(),
		pull: 12,
	})));
	assert!(response.is_error());

	assert_eq!(block_on(resolve_page(&background, &pull_page())), PagePlan::NotLoggedIn);

	let state = block_on(load_preview(
		&background,
		&identity("process.bpmn", ChangeStatus::Modified),
	));
	assert_eq!(state, PreviewState::Error(Notice::NotLoggedIn));
	assert!(repo.content_requests.borrow().is_empty());
}

#[test]
fn test_pull_page_lists_supported_files() {
	let (background, repo) = extension(MemoryCredentialStore::with_token("valid"));
	let plan = block_on(resolve_page(&background, &pull_page()));

	let PagePlan::Diff {
		sha,
		parent_sha,
		files,
		..
	} = plan
	else {
		panic!("expected a diff plan");
	};
	assert_eq!((sha.as_str(), parent_sha.as_str()), ("head", "base"));
	let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
	assert_eq!(names, ["process.bpmn", "new.dmn"]);
	assert!(repo.content_requests.borrow().is_empty());
}

#[test]
fn test_unsupported_file_issues_no_fetch() {
	let (background, repo) = extension(MemoryCredentialStore::with_token("valid"));
	let state = block_on(load_preview(&background, &identity("README.md", ChangeStatus::Modified)));

	assert!(matches!(state, PreviewState::Error(Notice::Generic { .. })));
	assert!(repo.content_requests.borrow().is_empty());
}

#[test]
fn test_navigation_applies_only_the_latest_plan() {
	let (background, _) = extension(MemoryCredentialStore::with_token("valid"));
	let mut navigation = Navigation::default();

	let files = navigation.visit("https://github.com/octo/flows/pull/12/files");
	let commit = navigation.visit("https://github.com/octo/flows/commit/c0ffee");

	// The pull request plan resolves after the user already moved on.
	let stale = block_on(resolve_page(&background, files.kind.as_ref().expect("pull page")));
	let latest = block_on(resolve_page(&background, commit.kind.as_ref().expect("commit page")));
	assert!(!navigation.is_current(files.generation));
	assert!(navigation.is_current(commit.generation));

	let sha = |plan: &PagePlan| match plan {
		PagePlan::Diff { sha, .. } => sha.clone(),
		other => panic!("expected a diff plan, got {other:?}"),
	};
	assert_eq!(sha(&stale), "head");
	assert_eq!(sha(&latest), "c0ffee");

	let anchor = navigation.visit("https://github.com/octo/flows/commit/c0ffee#diff-1f2e");
	assert!(!anchor.changed);
	assert!(navigation.is_current(commit.generation));
}
