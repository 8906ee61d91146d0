// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Calliope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Calliope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Calliope CLI entrypoint.
//!
//! `calliope <project>` prints a summary of the project at that path;
//! `--json` makes the summary machine readable.
//!
//! `--convert <dest>` saves a copy at `<dest>`, packed with `--archive` or
//! spread out with `--folder`.

use std::error::Error;
use std::path::Path;

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calliope::model::{FormatVersion, InfoField, OutlineItem, Project};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <project> [--json]\n  {program} <project> --convert <dest> (--archive | --folder)\n\nPrints a summary of the project at <project>. --json emits the summary\nas JSON instead of text.\n\n--convert writes a copy of the project to <dest>: --archive packs one\nzip file, --folder writes a version marker file plus a sibling directory\nof plain files. A format 0 project converted to --folder is upgraded to\nformat 1 first; format 0 has no folder layout.\n\nNon-fatal loading and saving problems are listed on stderr."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    project: Option<String>,
    json: bool,
    convert: Option<String>,
    archive: bool,
    folder: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => {
                if options.json {
                    return Err(());
                }
                options.json = true;
            }
            "--convert" => {
                if options.convert.is_some() {
                    return Err(());
                }
                let dest = args.next().ok_or(())?;
                options.convert = Some(dest);
            }
            "--archive" => {
                if options.archive {
                    return Err(());
                }
                options.archive = true;
            }
            "--folder" => {
                if options.folder {
                    return Err(());
                }
                options.folder = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.project.is_some() {
                    return Err(());
                }
                options.project = Some(arg);
            }
        }
    }

    if options.json && options.convert.is_some() {
        return Err(());
    }
    match &options.convert {
        // A destination needs exactly one container.
        Some(_) => {
            if options.archive == options.folder {
                return Err(());
            }
        }
        None => {
            if options.archive || options.folder {
                return Err(());
            }
        }
    }

    Ok(options)
}

#[derive(Debug, Serialize)]
struct ProjectSummary {
    title: String,
    author: String,
    location: String,
    container: &'static str,
    format: i64,
    outline_items: usize,
    words: usize,
    characters: usize,
    plots: usize,
    world_entries: usize,
    labels: usize,
    statuses: usize,
}

fn summarize(project: &Project) -> ProjectSummary {
    ProjectSummary {
        title: project.title().to_owned(),
        author: project
            .info(InfoField::Author)
            .unwrap_or_default()
            .to_owned(),
        location: project
            .location()
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
        container: if project.zipped() { "archive" } else { "folder" },
        format: project.version().as_int(),
        outline_items: project.outline().len(),
        words: project
            .outline()
            .children()
            .iter()
            .map(OutlineItem::word_count)
            .sum(),
        characters: project.characters().len(),
        plots: project.plots().len(),
        world_entries: project.world().len(),
        labels: project.labels().len(),
        statuses: project.statuses().len(),
    }
}

fn print_summary(summary: &ProjectSummary) {
    if summary.title.is_empty() {
        println!("(untitled project)");
    } else {
        println!("{}", summary.title);
    }
    if !summary.author.is_empty() {
        println!("  author:     {}", summary.author);
    }
    println!(
        "  location:   {} ({}, format {})",
        summary.location, summary.container, summary.format
    );
    println!(
        "  outline:    {} items, {} words",
        summary.outline_items, summary.words
    );
    println!("  characters: {}", summary.characters);
    println!("  plots:      {}", summary.plots);
    println!("  world:      {} entries", summary.world_entries);
    println!("  labels:     {}, statuses: {}", summary.labels, summary.statuses);
}

fn report_problems(problems: &[String]) {
    for problem in problems {
        eprintln!("calliope: {problem}");
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calliope=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "calliope".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        let Some(project_path) = options.project.as_deref() else {
            print_usage(&program);
            std::process::exit(2);
        };
        let location = Path::new(project_path);

        if let Some(dest) = options.convert.as_deref() {
            let mut project = Project::load(location)?;
            report_problems(project.loading_errors());

            if options.folder && project.version() == FormatVersion::V0 {
                eprintln!("calliope: format 0 has no folder layout; converting to format 1");
                project.set_version(FormatVersion::V1);
            }
            let report = project.save_as(Path::new(dest), options.archive)?;
            report_problems(project.saving_errors());
            println!("converted to '{dest}', {} entries written", report.written);
            return Ok(());
        }

        let project = Project::load(location)?;
        report_problems(project.loading_errors());

        let summary = summarize(&project);
        if options.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("calliope: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_positional_project() {
        let options = parse_options(["novel.cal".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.project.as_deref(), Some("novel.cal"));
        assert!(!options.json);
        assert!(options.convert.is_none());
    }

    #[test]
    fn parses_json_flag() {
        let options = parse_options(["novel.cal".to_owned(), "--json".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.project.as_deref(), Some("novel.cal"));
        assert!(options.json);
    }

    #[test]
    fn parses_convert_to_archive() {
        let options = parse_options(
            [
                "novel.cal".to_owned(),
                "--convert".to_owned(),
                "out.cal".to_owned(),
                "--archive".to_owned(),
            ]
            .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.convert.as_deref(), Some("out.cal"));
        assert!(options.archive);
        assert!(!options.folder);
    }

    #[test]
    fn parses_convert_to_folder() {
        let options = parse_options(
            [
                "novel.cal".to_owned(),
                "--convert".to_owned(),
                "out.cal".to_owned(),
                "--folder".to_owned(),
            ]
            .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.convert.as_deref(), Some("out.cal"));
        assert!(options.folder);
        assert!(!options.archive);
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(["a".to_owned(), "--json".to_owned(), "--json".to_owned()].into_iter())
            .unwrap_err();

        parse_options(
            [
                "a".to_owned(),
                "--convert".to_owned(),
                "x".to_owned(),
                "--convert".to_owned(),
                "y".to_owned(),
                "--archive".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_multiple_positional_projects() {
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_convert_without_container() {
        parse_options(
            ["novel.cal".to_owned(), "--convert".to_owned(), "out.cal".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_convert_with_both_containers() {
        parse_options(
            [
                "novel.cal".to_owned(),
                "--convert".to_owned(),
                "out.cal".to_owned(),
                "--archive".to_owned(),
                "--folder".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_container_without_convert() {
        parse_options(["novel.cal".to_owned(), "--archive".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_json_with_convert() {
        parse_options(
            [
                "novel.cal".to_owned(),
                "--json".to_owned(),
                "--convert".to_owned(),
                "out.cal".to_owned(),
                "--archive".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_convert_value() {
        parse_options(["novel.cal".to_owned(), "--convert".to_owned()].into_iter()).unwrap_err();
    }
}
