use clap::Parser;
use std::{
    error::Error,
    path::{Path, PathBuf},
    process::ExitCode,
};

use folio::{
    render::{FeedOptions, Options},
    utils::write,
    AllowPolicy, ContentExport, Sanitizer,
};

/// Sanitize rich text and render the site content exported from the backend.
#[derive(Debug, Parser)]
#[command(version)]
enum Command {
    /// Sanitize html files.
    Sanitize {
        /// Files to sanitize, glob patterns are expanded.
        #[clap(required = true)]
        patterns: Vec<String>,

        /// Write the results into this directory, under their original file names,
        /// instead of printing them.
        #[clap(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        options: CliOptions,
    },
    /// Render a content export into a standalone html page.
    Render {
        /// Json export of the posts, projects and faq tables.
        export: PathBuf,

        /// Where to write the page. Printed if missing.
        #[clap(long)]
        out: Option<PathBuf>,

        /// Title of the page.
        #[clap(long, default_value = "Portfolio")]
        title: String,

        #[command(flatten)]
        render: RenderOptions,

        #[command(flatten)]
        options: CliOptions,
    },
    /// Render the published posts of a content export as an atom feed.
    Feed {
        /// Json export of the posts, projects and faq tables.
        export: PathBuf,

        /// Absolute url of the site, used for links and ids.
        #[clap(long)]
        site_url: String,

        /// Where to write the feed. Printed if missing.
        #[clap(long)]
        out: Option<PathBuf>,

        /// Title of the feed.
        #[clap(long, default_value = "Blog")]
        title: String,

        #[command(flatten)]
        render: RenderOptions,

        #[command(flatten)]
        options: CliOptions,
    },
}
impl Command {
    fn options(&self) -> &CliOptions {
        match self {
            Command::Sanitize { options, .. }
            | Command::Render { options, .. }
            | Command::Feed { options, .. } => options,
        }
    }
}

#[derive(Debug, Clone, Parser)]
struct CliOptions {
    /// Json file with the allow policy to use instead of the built-in one.
    #[clap(long)]
    policy: Option<PathBuf>,

    /// Log every attribute and tag that gets removed.
    #[clap(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Parser)]
struct RenderOptions {
    /// Public url of the storage bucket, bare image paths are resolved against it.
    #[clap(long)]
    storage_url: Option<String>,

    /// Maximum length of generated post excerpts, in characters.
    #[clap(long, default_value_t = 160)]
    excerpt_length: usize,
}
impl RenderOptions {
    fn options<'a>(&'a self, sanitizer: &'a Sanitizer) -> Options<'a> {
        Options {
            sanitizer,
            storage_url: self.storage_url.as_deref(),
            excerpt_length: self.excerpt_length,
        }
    }
}

fn main() -> ExitCode {
    let command = Command::parse();

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    let CliOptions { policy, verbose } = command.options();

    let level = if *verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    let sanitizer = match policy {
        Some(path) => {
            log::info!("Loading allow policy from {path:?}");
            Sanitizer::new(AllowPolicy::from_file(path)?)?
        }
        None => Sanitizer::default(),
    };

    match command {
        Command::Sanitize { patterns, out, .. } => {
            for path in expand_patterns(&patterns)? {
                log::info!("Sanitizing {path:?}...");
                let raw = std::fs::read_to_string(&path)?;
                let clean = sanitizer.sanitize(&raw);

                match &out {
                    Some(dir) => {
                        let file_name = path
                            .file_name()
                            .ok_or(format!("{path:?} has no file name"))?;
                        write(dir.join(file_name), clean)?;
                    }
                    None => println!("{clean}"),
                }
            }
        }
        Command::Render {
            export,
            out,
            title,
            render,
            ..
        } => {
            let export = read_export(&export)?;

            log::info!("Generating html page...");
            let page = export.to_html_page(&title, render.options(&sanitizer));
            output(out, page)?;
        }
        Command::Feed {
            export,
            site_url,
            out,
            title,
            render,
            ..
        } => {
            let export = read_export(&export)?;

            log::info!("Generating atom feed...");
            let feed = export.to_atom_feed(
                FeedOptions {
                    title: &title,
                    site_url: &site_url,
                },
                render.options(&sanitizer),
            );
            output(out, feed)?;
        }
    }

    log::info!("Done");
    Ok(())
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut paths = vec![];

    for pattern in patterns {
        let matches = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        if matches.is_empty() {
            log::warn!("No files match {pattern}");
        }
        paths.extend(matches.into_iter().filter(|path| path.is_file()));
    }

    Ok(paths)
}

fn read_export(path: &Path) -> Result<ContentExport, Box<dyn Error>> {
    log::info!("Reading content export {path:?}");
    let json = std::fs::read_to_string(path)?;
    let export: ContentExport = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid content export {path:?}: {e}"))?;
    log::info!(
        "Read {} posts, {} projects and {} faq entries",
        export.posts.len(),
        export.projects.len(),
        export.faqs.len()
    );
    Ok(export)
}

fn output(path: Option<PathBuf>, contents: String) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) => {
            log::info!("Writing {path:?}");
            write(path, contents)?;
        }
        None => println!("{contents}"),
    }
    Ok(())
}
