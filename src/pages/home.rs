use std::collections::BTreeSet;

use leptos::ev::MouseEvent;
use leptos::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::components::galaxy::{CodeGalaxy, download, export_galaxy_image};
use crate::galaxy::export::{export_file_stem, export_json};
use crate::galaxy::provider::{TreeProvider, analyze_repository};
use crate::galaxy::summary::{CodeSummary, SummaryProvider, summarize_file};
use crate::galaxy::types::{EntryKind, TreeEntry};
use crate::galaxy::{
	FetchError, FileNode, Filter, GalaxyConfig, RepositoryGraph, StructuralLinks,
	VisualizationMode, project,
};

const SAMPLE_URL: &str = "https://github.com/code-galaxy/sample";
const SAMPLE_SEED: u64 = 2024;

const SAMPLE_PATHS: &[&str] = &[
	"README.md",
	"Cargo.toml",
	"src/main.rs",
	"src/lib.rs",
	"src/config.rs",
	"src/engine/mod.rs",
	"src/engine/forces.rs",
	"src/engine/integrate.rs",
	"src/engine/collide.rs",
	"src/scene/camera.rs",
	"src/scene/picking.rs",
	"src/scene/bodies.rs",
	"web/index.html",
	"web/styles/main.css",
	"web/styles/panel.css",
	"web/app.ts",
	"web/components/Galaxy.tsx",
	"web/components/Panel.tsx",
	"web/components/Search.tsx",
	"web/hooks/useGalaxy.ts",
	"web/utils/color.js",
	"scripts/fetch_tree.py",
	"scripts/summarize.py",
	"tools/bench/main.go",
	"tools/bench/report.go",
	"native/ffi.c",
	"native/ffi.cpp",
	"assets/logo.png",
];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Serves a fixed listing on `main` only.
struct SampleTree;

impl TreeProvider for SampleTree {
	fn fetch_tree(
		&self,
		_owner: &str,
		_repo: &str,
		branch: &str,
	) -> Result<Vec<TreeEntry>, FetchError> {
		if branch != "main" {
			return Err(FetchError::NotFound {
				branch: branch.to_string(),
			});
		}
		Ok(SAMPLE_PATHS
			.iter()
			.enumerate()
			.map(|(i, path)| TreeEntry {
				path: path.to_string(),
				kind: EntryKind::Blob,
				size: Some(400 + (rand_simple(i) * 12_000.0) as u64),
			})
			.collect())
	}
}

/// Outlines a sample file and answers in the shape a text model would:
/// fenced JSON for code, loose prose for markup.
struct SampleSummaries;

fn file_stem(file_path: &str) -> String {
	let name = file_path.rsplit('/').next().unwrap_or(file_path);
	name.split('.').next().unwrap_or(name).to_lowercase().replace('-', "_")
}

impl SummaryProvider for SampleSummaries {
	fn file_content(&self, file_path: &str) -> Result<String, FetchError> {
		let stem = file_stem(file_path);
		Ok(format!("// {file_path}\nfn {stem}() {{}}\nfn init_{stem}() {{}}\n"))
	}

	fn summarize(&self, file_path: &str, content: &str) -> Result<String, FetchError> {
		if file_path.ends_with(".css") || file_path.ends_with(".html") {
			return Ok(format!("{file_path} is markup with no functions to report."));
		}
		let functions: Vec<&str> = content
			.lines()
			.filter_map(|line| line.strip_prefix("fn "))
			.filter_map(|line| line.split('(').next())
			.collect();
		let body = serde_json::json!({
			"purpose": format!("Declares {} entry points for {file_path}.", functions.len()),
			"criticalFunctions": functions,
			"refactoringPriority": 1 + content.len() % 5,
		});
		Ok(format!("Here is the analysis:\n```json\n{body}\n```"))
	}
}

fn load_sample(
	provider: &dyn TreeProvider,
	config: &GalaxyConfig,
) -> Result<RepositoryGraph, FetchError> {
	let synthesizer = StructuralLinks::from_config(&config.links);
	let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
	analyze_repository(provider, SAMPLE_URL, config, &synthesizer, &mut rng)
}

/// The graph to show, or the message explaining why there is none.
fn initial_graph(
	provider: &dyn TreeProvider,
	config: &GalaxyConfig,
) -> (Option<RepositoryGraph>, Option<String>) {
	match load_sample(provider, config) {
		Ok(graph) => (Some(graph), None),
		Err(e) => {
			log::warn!("sample repository failed to load: {e}");
			(None, Some(e.to_string()))
		}
	}
}

fn priority_class(priority: u8) -> &'static str {
	match priority {
		4.. => "priority high",
		3 => "priority medium",
		_ => "priority low",
	}
}

fn export_data(graph: &RepositoryGraph) -> Result<(), String> {
	let stem = export_file_stem(&graph.metadata);
	let json = export_json(graph).map_err(|e| {
		log::warn!("graph export failed: {e}");
		format!("Failed to export data: {e}")
	})?;
	let href = format!(
		"data:application/json;charset=utf-8,{}",
		String::from(js_sys::encode_uri_component(&json))
	);
	download(&format!("{stem}.json"), &href).map_err(|e| {
		log::warn!("graph download failed: {e:?}");
		"Failed to export data".to_string()
	})
}

fn export_image(graph: &RepositoryGraph) -> Result<(), String> {
	let Some(href) = export_galaxy_image() else {
		log::warn!("galaxy canvas not available for export");
		return Err("Failed to export image".to_string());
	};
	let stem = export_file_stem(&graph.metadata);
	download(&format!("{stem}.png"), &href).map_err(|e| {
		log::warn!("image download failed: {e:?}");
		"Failed to export image".to_string()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = GalaxyConfig::default();
	let (initial, failure) = initial_graph(&SampleTree, &config);
	let graph = RwSignal::new(initial);
	let notice = RwSignal::new(failure);
	let (filter, set_filter) = signal(Filter::default());
	let (mode, set_mode) = signal(VisualizationMode::default());
	let (reset, set_reset) = signal(0u32);
	let (selected, set_selected) = signal(None::<FileNode>);

	let view = Memo::new(move |_| {
		graph.with(|g| g.as_ref().map(|g| filter.with(|f| project(g, f))))
	});
	let summary = Memo::new(move |_| {
		selected.with(|s| {
			s.as_ref().map(|node| {
				summarize_file(&SampleSummaries, &node.id).map(|(_, summary)| summary)
			})
		})
	});
	let languages = Memo::new(move |_| {
		graph.with(|g| {
			g.iter()
				.flat_map(|g| g.nodes.iter().map(|n| n.language.clone()))
				.collect::<BTreeSet<_>>()
				.into_iter()
				.collect::<Vec<_>>()
		})
	});

	// A selection outside the current view is dropped.
	Effect::new(move |_| {
		let stale = view.with(|v| {
			selected.with_untracked(|s| match (v, s) {
				(_, None) => false,
				(None, Some(_)) => true,
				(Some(v), Some(node)) => !v.contains(&node.id),
			})
		});
		if stale {
			set_selected.set(None);
		}
	});

	let on_node_click = Callback::new(move |node: FileNode| {
		log::debug!("selected {}", node.id);
		set_selected.set(Some(node));
	});

	let on_search = move |text: String| {
		set_filter.set(Filter {
			text,
			..filter.get_untracked()
		});
	};
	let on_language = move |language: String| {
		let languages = if language.is_empty() {
			Vec::new()
		} else {
			vec![language]
		};
		set_filter.set(Filter {
			languages,
			..filter.get_untracked()
		});
	};
	let on_min_lines = move |raw: String| {
		let min_lines = raw.trim().parse().unwrap_or(0);
		set_filter.set(Filter {
			min_lines,
			..filter.get_untracked()
		});
	};
	let run_export = move |export: fn(&RepositoryGraph) -> Result<(), String>| {
		if let Some(Err(message)) = graph.with_untracked(|g| g.as_ref().map(export)) {
			notice.set(Some(message));
		}
	};
	let toggle_mode = move |_: MouseEvent| {
		set_mode.update(|m| {
			*m = match m {
				VisualizationMode::Structural => VisualizationMode::Dependency,
				VisualizationMode::Dependency => VisualizationMode::Structural,
			}
		})
	};

	view! {
		<div class="fullscreen-graph">
			<CodeGalaxy
				view=view
				mode=mode
				reset_trigger=reset
				on_node_click=on_node_click
				config=config
			/>
			<div class="graph-overlay">
				<h1>"Code Galaxy"</h1>
				<p class="subtitle">
					{move || {
						graph
							.with(|g| {
								g.as_ref()
									.map(|g| {
										format!(
											"{}/{}: {} files, {} lines",
											g.metadata.owner,
											g.metadata.repo,
											g.metadata.total_files,
											g.metadata.total_loc,
										)
									})
							})
					}}
				</p>
				<div class="controls">
					<input
						type="search"
						placeholder="Search files"
						prop:value=move || filter.with(|f| f.text.clone())
						on:input=move |ev| on_search(event_target_value(&ev))
					/>
					<select on:change=move |ev| on_language(event_target_value(&ev))>
						<option value="">"All languages"</option>
						{move || {
							languages
								.get()
								.into_iter()
								.map(|l| {
									let value = l.clone();
									view! { <option value=value>{l}</option> }
								})
								.collect_view()
						}}
					</select>
					<input
						type="number"
						min="0"
						placeholder="Min lines"
						on:input=move |ev| on_min_lines(event_target_value(&ev))
					/>
					<button on:click=toggle_mode>
						{move || match mode.get() {
							VisualizationMode::Structural => "Show dependencies",
							VisualizationMode::Dependency => "Show structure",
						}}
					</button>
					<button on:click=move |_| set_reset.update(|n| *n += 1)>"Reset view"</button>
					<button on:click=move |_| run_export(export_data)>"Export JSON"</button>
					<button on:click=move |_| run_export(export_image)>"Export PNG"</button>
				</div>
				<p class="subtitle">"Drag to orbit. Scroll to zoom. Click a body to inspect it."</p>
			</div>
			{move || {
				notice
					.get()
					.map(|message| {
						view! {
							<div class="notice" role="alert">
								<span>{message}</span>
								<button on:click=move |_| notice.set(None)>"Dismiss"</button>
							</div>
						}
					})
			}}
			{move || {
				selected
					.get()
					.map(|node| {
						view! {
							<aside class="file-panel">
								<button class="close" on:click=move |_| set_selected.set(None)>
									"×"
								</button>
								<h2>{node.name.clone()}</h2>
								<p class="path">{node.path.clone()}</p>
								<dl>
									<dt>"Language"</dt>
									<dd>{node.language.clone()}</dd>
									<dt>"Lines"</dt>
									<dd>{node.loc}</dd>
									<dt>"Size"</dt>
									<dd>{format!("{:.1} KB", node.size as f64 / 1024.0)}</dd>
									<dt>"Importance"</dt>
									<dd>{format!("{:.1}", node.importance)}</dd>
								</dl>
								{node.is_star.then(|| view! { <p class="star">"Focal file"</p> })}
								{move || summary.get().map(summary_view)}
							</aside>
						}
					})
			}}
		</div>
	}
}

fn summary_view(result: Result<CodeSummary, FetchError>) -> AnyView {
	match result {
		Ok(summary) => {
			view! {
				<section class="summary">
					<h3>"Purpose"</h3>
					<p>{summary.purpose}</p>
					<h3>"Critical functions"</h3>
					<ul>
						{summary
							.critical_functions
							.into_iter()
							.map(|f| view! { <li><code>{f}</code></li> })
							.collect_view()}
					</ul>
					<h3>"Refactoring priority"</h3>
					<span class=priority_class(summary.refactoring_priority)>
						{format!("Level {}/5", summary.refactoring_priority)}
					</span>
				</section>
			}
				.into_any()
		}
		Err(e) => {
			log::warn!("summary failed: {e}");
			view! { <p class="summary-error">"Failed to generate AI summary"</p> }.into_any()
		}
	}
}
