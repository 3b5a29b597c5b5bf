mod config;
mod paint;
mod source;
mod view;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use api_client::ApiClient;
use clap::{Arg, ArgAction, ArgMatches, Command};
use gpui::*;
use graphview::{
    ExpansionPath, GraphRenderer, MindMap, Orientation, OutlineRenderer, SvgRenderer,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ViewerConfig;
use crate::source::GraphSource;
use crate::view::{MindMapView, NodeExpanded, NodeSelected};

const DEFAULT_LOG_FILTER: &str = "info,graphview=debug";

fn cli() -> Command {
    Command::new("dss-mindmap")
        .about("Interactive mind map of decision-support posts")
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("BASE_URL")
                .help("API base URL; overrides the config file")
                .conflicts_with("file"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Read the graph from a JSON file instead of the API"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON config with `client` and `mindmap` sections"),
        )
        .arg(
            Arg::new("expand")
                .long("expand")
                .value_name("PATH")
                .action(ArgAction::Append)
                .help("Expansion path to open, e.g. `12` or `12-40`; repeatable"),
        )
        .arg(
            Arg::new("orientation")
                .long("orientation")
                .value_name("DIR")
                .value_parser(["tb", "lr"])
                .help("Rank direction: top-to-bottom or left-to-right"),
        )
        .arg(
            Arg::new("export_svg")
                .long("export-svg")
                .value_name("OUT")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Render the map to an SVG file and exit"),
        )
        .arg(
            Arg::new("outline")
                .long("outline")
                .action(ArgAction::SetTrue)
                .help("Print the visible tree as an indented outline and exit"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .value_name("FILTER")
                .help("Log filter directives, e.g. `debug` or `info,graphview=trace`"),
        )
}

fn init_tracing(directives: Option<&str>) {
    let filter = match directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

struct Options {
    config: ViewerConfig,
    source: GraphSource,
    expand: Vec<ExpansionPath>,
    export_svg: Option<PathBuf>,
    outline: bool,
}

impl Options {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(url) = matches.get_one::<String>("url") {
            config.client.base_url = url.clone();
        }
        if let Some(orientation) = matches.get_one::<String>("orientation") {
            config.mindmap.layout.orientation = orientation.parse::<Orientation>()?;
        }

        let source = match matches.get_one::<PathBuf>("file") {
            Some(path) => GraphSource::File(path.clone()),
            None => GraphSource::Api(
                ApiClient::new(config.client.clone()).context("invalid API base URL")?,
            ),
        };
        let expand = matches
            .get_many::<String>("expand")
            .map(|paths| paths.map(|path| ExpansionPath::from(path.as_str())).collect())
            .unwrap_or_default();

        Ok(Self {
            config,
            source,
            expand,
            export_svg: matches.get_one::<PathBuf>("export_svg").cloned(),
            outline: matches.get_flag("outline"),
        })
    }

    fn headless(&self) -> bool {
        self.export_svg.is_some() || self.outline
    }
}

/// Loads once, applies the requested expansion and writes the outputs.
fn run_headless(options: Options, runtime: &tokio::runtime::Runtime) -> Result<()> {
    let data = options.source.fetch_graph_blocking(runtime.handle())?;
    let mut map = MindMap::new(options.config.mindmap.clone());
    map.load(data);
    if !options.expand.is_empty() {
        map.expand_paths(&options.expand);
    }

    if options.outline {
        let mut outline = OutlineRenderer;
        let text = outline.render(map.visible(), map.layout(), &map.viewport_state())?;
        println!("{text}");
    }
    if let Some(out) = &options.export_svg {
        let mut renderer = SvgRenderer::new(
            options.config.mindmap.style.clone(),
            map.viewport().container(),
        )
        .with_current(map.current().map(str::to_string));
        let document = renderer.render(map.visible(), map.layout(), &map.viewport_state())?;
        SvgRenderer::save(out, &document)?;
        info!(path = %out.display(), nodes = map.visible().nodes.len(), "wrote svg");
    }
    Ok(())
}

fn run_window(options: Options, runtime: &tokio::runtime::Runtime) {
    let handle = runtime.handle().clone();
    let Options {
        config,
        source,
        expand,
        ..
    } = options;

    Application::new().run(move |cx: &mut App| {
        let window_opts = WindowOptions {
            titlebar: Some(TitlebarOptions {
                title: Some("DSS Mind Map".into()),
                ..Default::default()
            }),
            app_id: Some("dss-mindmap".to_string()),
            ..Default::default()
        };

        let opened = cx.open_window(window_opts, |_, cx| {
            let view = cx.new(|cx| {
                MindMapView::new(
                    MindMap::new(config.mindmap.clone()),
                    source.clone(),
                    handle.clone(),
                    expand.clone(),
                    cx,
                )
            });
            cx.subscribe(&view, |_, event: &NodeSelected, _| {
                info!(slug = %event.slug, "post selected");
            })
            .detach();
            cx.subscribe(&view, |_, event: &NodeExpanded, _| {
                debug!(path = %event.path, "node toggled");
            })
            .detach();
            view
        });
        if let Err(err) = opened {
            error!(%err, "failed to open window");
            cx.quit();
            return;
        }
        cx.activate(true);
    });
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log").map(String::as_str));

    let options = Options::from_matches(&matches)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    if options.headless() {
        return run_headless(options, &runtime);
    }
    if let GraphSource::File(path) = &options.source
        && !path.exists()
    {
        bail!("graph file {} does not exist", path.display());
    }
    run_window(options, &runtime);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    // `gpui::*` exports its own `test` macro; use the built-in one.
    use core::prelude::v1::test;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn flags_map_onto_options() {
        let matches = cli()
            .try_get_matches_from([
                "dss-mindmap",
                "--file",
                "graph.json",
                "--expand",
                "1",
                "--expand",
                "1-3",
                "--orientation",
                "lr",
                "--outline",
            ])
            .unwrap();
        let options = Options::from_matches(&matches).unwrap();
        assert!(matches!(options.source, GraphSource::File(_)));
        assert_eq!(
            options.expand,
            [ExpansionPath::from("1"), ExpansionPath::from("1-3")]
        );
        assert_eq!(
            options.config.mindmap.layout.orientation,
            Orientation::LeftToRight
        );
        assert!(options.headless());
    }

    #[test]
    fn url_and_file_are_exclusive() {
        let result = cli().try_get_matches_from([
            "dss-mindmap",
            "--url",
            "http://localhost:8000/api",
            "--file",
            "graph.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn url_overrides_the_client_config() {
        let matches = cli()
            .try_get_matches_from(["dss-mindmap", "--url", "https://dss.example/api"])
            .unwrap();
        let options = Options::from_matches(&matches).unwrap();
        assert_eq!(options.config.client.base_url, "https://dss.example/api");
        assert!(options.source.client().is_some());
        assert!(!options.headless());
    }
}
