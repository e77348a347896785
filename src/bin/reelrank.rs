//! Binary entry point for the reelrank recommendation CLI.
#![forbid(unsafe_code)]

#[path = "reelrank/config.rs"]
mod config;
#[path = "reelrank/ui.rs"]
mod ui;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reelrank::datagen::{self, DataGenerator};
use reelrank::graph::{AdjacencySnapshot, ScatterFrame, ViewGraph};
use reelrank::ingest::{read_movies, read_reviews, MovieCsvConfig, ReviewCsvConfig};
use reelrank::logging::init_logging;
use reelrank::prefs::{search_titles, FixedSelection, KeywordSelection, PreferenceProvider};
use reelrank::{
    BuildOutput, EngineConfig, Graph, GraphBuilder, RecommendationReport, SimilarityWeights,
};

use config::{CliConfig, Profile};
use ui::{format_duration, Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "reelrank",
    version,
    about = "Movie recommendations from a weighted review graph",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ThemeArg::Auto,
        help = "Console color theme"
    )]
    theme: ThemeArg,

    #[arg(long, global = true, help = "Suppress decorative output")]
    quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        default_value = "warn",
        help = "Tracing filter, e.g. reelrank=debug"
    )]
    log: String,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Path to the CLI config file"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "NAME",
        help = "Config profile supplying dataset paths and tunables"
    )]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DatasetArgs {
    #[arg(long, value_name = "FILE", help = "CSV file containing movies")]
    movies: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "CSV file containing reviews")]
    reviews: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    #[arg(
        long,
        value_name = "TITLE",
        conflicts_with = "keyword",
        help = "Center the ranking on this exact title"
    )]
    movie: Option<String>,

    #[arg(
        long,
        value_name = "WORD",
        help = "Center the ranking on the best title match for a keyword"
    )]
    keyword: Option<String>,

    #[arg(
        long,
        value_name = "LIST",
        default_value = "",
        help = "Favourite genres, '&' or comma separated"
    )]
    genres: String,
}

#[derive(Args, Debug)]
struct EngineArgs {
    #[arg(long, value_name = "N", help = "Number of recommendations to return")]
    limit: Option<usize>,

    #[arg(
        long,
        value_name = "N",
        help = "Distinct review scores required before a movie is ranked"
    )]
    min_reviews: Option<usize>,

    #[arg(
        long,
        value_name = "FRACTION",
        help = "Similarity weight on the direct movie edge; the rest goes to genre similarity"
    )]
    movie_weight: Option<f64>,

    #[arg(
        long,
        value_name = "FRACTION",
        help = "Genre-similarity threshold for the simplified graph"
    )]
    threshold: Option<f64>,
}

#[derive(Args, Debug)]
struct RecommendCmd {
    #[command(flatten)]
    data: DatasetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    engine: EngineArgs,

    #[arg(long, help = "Include review counts in the printed report")]
    show_reviews: bool,
}

#[derive(Args, Debug)]
struct InspectCmd {
    #[command(flatten)]
    data: DatasetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    engine: EngineArgs,

    #[arg(
        long,
        value_name = "TITLE",
        help = "Report scoring details for one movie instead of build counters"
    )]
    title: Option<String>,
}

#[derive(Args, Debug)]
struct SearchCmd {
    #[command(flatten)]
    data: DatasetArgs,

    #[arg(value_name = "KEYWORD")]
    keyword: String,
}

#[derive(Args, Debug)]
struct ExportCmd {
    #[command(flatten)]
    data: DatasetArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(flatten)]
    engine: EngineArgs,

    #[arg(long, value_enum, help = "Which projection of the graph to export")]
    surface: SurfaceArg,

    #[arg(
        long,
        value_name = "FILE",
        help = "Write JSON here instead of stdout"
    )]
    out: Option<PathBuf>,

    #[arg(
        long,
        value_name = "N",
        help = "Vertex cap for the view surface"
    )]
    max_vertices: Option<usize>,
}

#[derive(Args, Debug)]
struct GenerateCmd {
    #[arg(long, value_name = "FILE", help = "Output CSV for movies")]
    movies_out: PathBuf,

    #[arg(long, value_name = "FILE", help = "Output CSV for reviews")]
    reviews_out: PathBuf,

    #[arg(long, value_name = "N", default_value_t = 200, help = "Movies to generate")]
    movie_count: usize,

    #[arg(long, value_name = "N", default_value_t = 2000, help = "Reviews to generate")]
    review_count: usize,

    #[arg(long, value_name = "SEED", help = "Seed for reproducible datasets")]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Build the graph and print ranked recommendations")]
    Recommend(RecommendCmd),

    #[command(about = "Build the graph and print construction statistics")]
    Inspect(InspectCmd),

    #[command(about = "Search the movie catalog by title keyword")]
    Search(SearchCmd),

    #[command(about = "Build the graph and export a serializable surface")]
    Export(ExportCmd),

    #[command(about = "Generate synthetic movie/review CSV datasets")]
    Generate(GenerateCmd),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SurfaceArg {
    Snapshot,
    View,
    Scatter,
}

struct AppContext {
    config: CliConfig,
    profile: Option<Profile>,
    ui: Ui,
}

impl AppContext {
    fn resolve_movies(&self, args: &DatasetArgs) -> Result<PathBuf, Box<dyn Error>> {
        args.movies
            .clone()
            .or_else(|| self.profile.as_ref().and_then(|p| p.movies.clone()))
            .or_else(|| self.config.default_movies().cloned())
            .ok_or_else(|| "a movies CSV is required; pass --movies or set it in the config".into())
    }

    fn resolve_reviews(&self, args: &DatasetArgs) -> Result<PathBuf, Box<dyn Error>> {
        args.reviews
            .clone()
            .or_else(|| self.profile.as_ref().and_then(|p| p.reviews.clone()))
            .or_else(|| self.config.default_reviews().cloned())
            .ok_or_else(|| {
                "a reviews CSV is required; pass --reviews or set it in the config".into()
            })
    }

    fn engine_config(&self, args: &EngineArgs) -> Result<EngineConfig, Box<dyn Error>> {
        let mut cfg = EngineConfig::default();
        if let Some(profile) = &self.profile {
            if let Some(threshold) = profile.similarity_threshold {
                cfg.similarity_threshold = threshold;
            }
            if let Some(min_reviews) = profile.min_reviews {
                cfg.min_reviews = min_reviews;
            }
            if let Some(weight) = profile.movie_weight {
                cfg.weights = SimilarityWeights::from_movie_fraction(weight);
            }
            if let Some(limit) = profile.limit {
                cfg.limit = limit;
            }
        }
        if let Some(threshold) = args.threshold {
            cfg.similarity_threshold = threshold;
        }
        if let Some(min_reviews) = args.min_reviews {
            cfg.min_reviews = min_reviews;
        }
        if let Some(weight) = args.movie_weight {
            cfg.weights = SimilarityWeights::from_movie_fraction(weight);
        }
        if let Some(limit) = args.limit {
            cfg.limit = limit;
        }

        if !(0.0..=1.0).contains(&cfg.weights.movie) {
            return Err("--movie-weight must lie in [0, 1]".into());
        }
        if !(cfg.similarity_threshold > 0.0 && cfg.similarity_threshold <= 1.0) {
            return Err("--threshold must lie in (0, 1]".into());
        }
        if cfg.min_reviews == 0 {
            return Err("--min-reviews must be at least 1".into());
        }
        Ok(cfg)
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let config = CliConfig::load(cli.config.clone())?;
    let profile_name = cli
        .profile
        .clone()
        .or_else(|| config.default_profile_name().map(str::to_string));
    let profile = match &profile_name {
        Some(name) => Some(config.profile(name)?.clone()),
        None => None,
    };
    if let Some(profile) = &profile {
        tracing::debug!(name = %profile.name, "config.profile.selected");
    }
    let ui = Ui::new(cli.theme.into(), cli.quiet);
    let ctx = AppContext {
        config,
        profile,
        ui,
    };

    match &cli.command {
        Command::Recommend(cmd) => cmd_recommend(&cli, cmd, &ctx),
        Command::Inspect(cmd) => cmd_inspect(&cli, cmd, &ctx),
        Command::Search(cmd) => cmd_search(&cli, cmd, &ctx),
        Command::Export(cmd) => cmd_export(&cli, cmd, &ctx),
        Command::Generate(cmd) => cmd_generate(cmd, &ctx),
    }
}

fn cmd_recommend(cli: &Cli, cmd: &RecommendCmd, ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let engine = ctx.engine_config(&cmd.engine)?;
    let output = build_graphs(cli, &cmd.data, &cmd.selection, &engine, ctx)?;
    let entries = output
        .graph
        .rank(engine.limit, engine.min_reviews, engine.weights)?;
    let report = RecommendationReport::compose(&output.graph, entries)?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            ctx.ui.spacer();
            print!("{}", report.render(cmd.show_reviews));
        }
    }
    Ok(())
}

fn cmd_inspect(cli: &Cli, cmd: &InspectCmd, ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let engine = ctx.engine_config(&cmd.engine)?;
    let output = build_graphs(cli, &cmd.data, &cmd.selection, &engine, ctx)?;

    if let Some(title) = &cmd.title {
        let details = MovieDetails::collect(&output.graph, title, &engine)?;
        return emit(cli.format, &details, || {
            ctx.ui.spacer();
            ctx.ui.section(
                &details.title,
                [
                    ("reviews", details.review_count.to_string()),
                    ("average score", format!("{:.3}", details.average_score)),
                    (
                        "strict average",
                        format!("{:.3}", details.average_score_strict),
                    ),
                    (
                        "average similarity",
                        format!("{:.3}", details.average_similarity),
                    ),
                    (
                        "overall similarity",
                        match details.overall_similarity {
                            Some(value) => format!("{value:.3}"),
                            None => "n/a (chosen movie)".to_string(),
                        },
                    ),
                ],
            );
        });
    }

    let summary = &output.summary;

    emit(cli.format, summary, || {
        ctx.ui.spacer();
        ctx.ui.section(
            "Catalog",
            [
                ("movies", summary.movies.to_string()),
                ("genre vocabulary", summary.genre_vocabulary.to_string()),
            ],
        );
        ctx.ui.section(
            "Reviews",
            [
                ("accepted", summary.reviews_accepted.to_string()),
                ("malformed score", summary.skipped_malformed_score.to_string()),
                (
                    "zero denominator",
                    summary.skipped_zero_denominator.to_string(),
                ),
                ("unknown movie", summary.skipped_unknown_movie.to_string()),
                (
                    "empty genre union",
                    summary.skipped_empty_genre_union.to_string(),
                ),
            ],
        );
        ctx.ui.section(
            "Graphs",
            [
                ("full vertices", summary.graph_vertices.to_string()),
                ("full edges", summary.graph_edges.to_string()),
                ("simplified vertices", summary.simplified_vertices.to_string()),
                ("simplified edges", summary.simplified_edges.to_string()),
            ],
        );
    })
}

/// Scoring queryables for a single movie, relative to the chosen one.
#[derive(Debug, serde::Serialize)]
struct MovieDetails {
    title: String,
    review_count: usize,
    average_score: f64,
    average_score_strict: f64,
    average_similarity: f64,
    /// None when the inspected movie is the chosen movie itself.
    overall_similarity: Option<f64>,
}

impl MovieDetails {
    fn collect(graph: &Graph, title: &str, engine: &EngineConfig) -> Result<Self, Box<dyn Error>> {
        let item = graph
            .all_vertices(None)
            .into_iter()
            .find(|item| {
                item.movie_title()
                    .map_or(false, |t| t.eq_ignore_ascii_case(title))
            })
            .ok_or_else(|| format!("no movie titled {title:?} in the graph"))?;
        let chosen = graph.chosen_vertex()?.item.clone();
        let overall_similarity = if item == chosen {
            None
        } else {
            Some(graph.overall_similarity_score(&item, &chosen, engine.weights)?)
        };
        Ok(Self {
            title: item.to_string(),
            review_count: graph.number_of_reviews(&item)?,
            average_score: graph.average_score(&item)?,
            average_score_strict: graph.average_score_strict(&item, engine.min_reviews)?,
            average_similarity: graph.average_similarity(&item)?,
            overall_similarity,
        })
    }
}

fn cmd_search(cli: &Cli, cmd: &SearchCmd, ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let movies_path = ctx.resolve_movies(&cmd.data)?;
    let records = read_movies(&MovieCsvConfig::new(&movies_path))?;
    let mut builder = GraphBuilder::new(EngineConfig::default());
    builder.add_movies(records);
    let matches = search_titles(builder.catalog(), &cmd.keyword);

    match cli.format {
        OutputFormat::Json => {
            let entries: Vec<_> = matches
                .iter()
                .map(|(id, title)| serde_json::json!({ "id": id, "title": title }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if matches.is_empty() {
                ctx.ui
                    .info(&format!("no titles match '{}'", cmd.keyword));
            } else {
                ctx.ui.list(
                    &format!("{} matching titles", matches.len()),
                    matches
                        .iter()
                        .map(|(id, title)| format!("{title}  ({id})")),
                );
            }
        }
    }
    Ok(())
}

fn cmd_export(cli: &Cli, cmd: &ExportCmd, ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let engine = ctx.engine_config(&cmd.engine)?;
    let output = build_graphs(cli, &cmd.data, &cmd.selection, &engine, ctx)?;

    let json = match cmd.surface {
        SurfaceArg::Snapshot => {
            serde_json::to_string_pretty(&AdjacencySnapshot::capture(&output.graph))?
        }
        SurfaceArg::View => {
            let cap = cmd.max_vertices.unwrap_or(engine.max_view_vertices);
            let view = ViewGraph::project(&output.simplified, cap, engine.weights)?;
            serde_json::to_string_pretty(&view)?
        }
        SurfaceArg::Scatter => {
            let frame = ScatterFrame::collect(&output.graph, engine.min_reviews, engine.weights)?;
            serde_json::to_string_pretty(&frame)?
        }
    };

    match &cmd.out {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(path = %path.display(), surface = ?cmd.surface, "export.written");
            ctx.ui
                .success(&format!("exported {:?} surface to {}", cmd.surface, path.display()));
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_generate(cmd: &GenerateCmd, ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    let mut generator = match cmd.seed {
        Some(seed) => DataGenerator::seeded(seed),
        None => DataGenerator::new(),
    };
    let (movies, reviews) = generator.generate_catalog(cmd.movie_count, cmd.review_count);
    datagen::write_movie_csv(&cmd.movies_out, &movies)?;
    datagen::write_review_csv(&cmd.reviews_out, &reviews)?;
    ctx.ui.success(&format!(
        "wrote {} movies to {} and {} reviews to {}",
        movies.len(),
        cmd.movies_out.display(),
        reviews.len(),
        cmd.reviews_out.display()
    ));
    Ok(())
}

fn build_graphs(
    cli: &Cli,
    data: &DatasetArgs,
    selection: &SelectionArgs,
    engine: &EngineConfig,
    ctx: &AppContext,
) -> Result<BuildOutput, Box<dyn Error>> {
    let movies_path = ctx.resolve_movies(data)?;
    let reviews_path = ctx.resolve_reviews(data)?;
    let provider = selection_provider(selection)?;

    let phase = ctx.ui.phase("reading datasets");
    let movie_records = read_movies(&MovieCsvConfig::new(&movies_path))?;
    let review_records = read_reviews(&ReviewCsvConfig::new(&reviews_path))?;
    phase.done();

    let phase = ctx.ui.phase("building graphs");
    let mut builder = GraphBuilder::new(engine.clone());
    builder.add_movies(movie_records);
    let chosen = provider.select(builder.catalog())?;
    builder.choose(chosen)?;
    builder.add_reviews(review_records)?;
    let output = builder.finish()?;
    let elapsed = phase.done();

    let skipped = output.summary.reviews_skipped();
    if skipped > 0 {
        ctx.ui.warn(&format!(
            "skipped {skipped} of {} review records",
            skipped + output.summary.reviews_accepted
        ));
    }
    // Keep stdout clean for JSON consumers.
    if cli.format == OutputFormat::Text {
        ctx.ui.info(&format!(
            "graph ready: {} vertices, {} edges in {}",
            output.summary.graph_vertices,
            output.summary.graph_edges,
            format_duration(elapsed)
        ));
    }
    Ok(output)
}

fn selection_provider(args: &SelectionArgs) -> Result<Box<dyn PreferenceProvider>, Box<dyn Error>> {
    if let Some(title) = &args.movie {
        Ok(Box::new(FixedSelection::new(title.clone(), &args.genres)))
    } else if let Some(keyword) = &args.keyword {
        Ok(Box::new(KeywordSelection::new(keyword.clone(), &args.genres)))
    } else {
        Err("pass --movie or --keyword to pick the center movie".into())
    }
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => printer(),
    }
    Ok(())
}
