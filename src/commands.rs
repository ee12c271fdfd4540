//! Subcommand implementations.

use std::path::Path;

use miette::miette;
use modwatch_config::Config;
use modwatch_extract::Extractor;
use modwatch_extract::models::Release;
use modwatch_library::{Assessment, Matcher, scan_dir};
use modwatch_remote::{HttpSource, PageSelector, PageSource, Reconciler, Site};
use modwatch_store::{Database, Repository};
use time::format_description::well_known::Rfc3339;

type Result<T> = miette::Result<T>;

fn report(e: impl std::fmt::Display) -> miette::Report {
    miette!("{e}")
}

async fn open(config: &Config) -> Result<(Database, Repository)> {
    if let Some(parent) = config.database.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(report)?;
    }
    let db = Database::connect(&config.database).await.map_err(report)?;
    let repo = Repository::from(&db);
    Ok((db, repo))
}

fn site(config: &Config) -> Result<Site> {
    Site::new(&config.site).map_err(report)
}

fn page_selector(page: Option<u32>) -> PageSelector {
    match page {
        Some(page) => PageSelector::Page(page),
        None => PageSelector::Default,
    }
}

fn uploaded(release: &Release) -> String {
    release
        .uploaded_at
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown date".to_string())
}

pub async fn add(config: &Config, slug: &str) -> Result<()> {
    let (db, repo) = open(config).await?;
    let site = site(config)?;
    let source = HttpSource::new().map_err(report)?;
    let reconciler = Reconciler::new(&source, &site, &repo, config.timestamps);
    let result = reconciler.reconcile(slug, PageSelector::Default).await.map_err(report);
    db.close().await;
    result?;
    println!("tracking {slug}");
    Ok(())
}

pub async fn update(config: &Config, slug: Option<&str>, page: Option<u32>) -> Result<()> {
    let (db, repo) = open(config).await?;
    let site = site(config)?;
    let source = HttpSource::new().map_err(report)?;
    let reconciler = Reconciler::new(&source, &site, &repo, config.timestamps);
    let slugs = match slug {
        Some(slug) => vec![slug.to_string()],
        None => repo.list_mods().await.map_err(report)?,
    };
    // Strictly sequential; one failing mod never takes the batch down.
    let mut failed = 0usize;
    for slug in &slugs {
        match reconciler.reconcile(slug, page_selector(page)).await {
            Ok(()) => tracing::info!(mod_slug = %slug, "reconciled"),
            Err(e) => {
                failed += 1;
                tracing::error!(mod_slug = %slug, error = %e, "reconcile failed; continuing with next mod");
            },
        }
    }
    db.close().await;
    println!("updated {} of {} mods", slugs.len() - failed, slugs.len());
    Ok(())
}

pub async fn scan(config: &Config, dir: Option<&Path>) -> Result<()> {
    let (db, repo) = open(config).await?;
    let site = site(config)?;
    let matcher = Matcher::build(&repo).await.map_err(report)?;
    let files = scan_dir(dir.unwrap_or(&config.mods_dir)).await.map_err(report)?;
    for file in &files {
        match matcher.assess(file) {
            Assessment::Unrecognized => println!("{}: unrecognized file", file.filename),
            Assessment::Current(release) => {
                println!("{}: {} ({}), up to date", file.filename, release.filename, release.version_label);
            },
            Assessment::Superseded { matched, better } => {
                let url = site
                    .release_url(&better.mod_slug, &better.remote_id)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| better.detail_path());
                println!(
                    "{}: {} ({}), newer release available: {} <{}>",
                    file.filename, matched.filename, matched.version_label, better.filename, url
                );
            },
        }
    }
    db.close().await;
    Ok(())
}

pub async fn list(config: &Config) -> Result<()> {
    let (db, repo) = open(config).await?;
    let slugs = repo.list_mods().await.map_err(report)?;
    db.close().await;
    for slug in slugs {
        println!("{slug}");
    }
    Ok(())
}

pub async fn show(config: &Config, slug: &str) -> Result<()> {
    let (db, repo) = open(config).await?;
    let site = site(config)?;
    let releases = repo.list_releases_for_mod(slug).await.map_err(report)?;
    db.close().await;
    println!("{slug}: {} known releases", releases.len());
    for release in releases {
        let hash = release.content_hash.map(|hash| hash.to_hex()).unwrap_or_else(|| "-".to_string());
        let url = site
            .release_url(&release.mod_slug, &release.remote_id)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| release.detail_path());
        println!(
            "  {} [{}] {} {} md5={} <{}>",
            release.filename,
            release.maturity,
            release.version_label,
            uploaded(&release),
            hash,
            url
        );
    }
    Ok(())
}

pub async fn inspect(config: &Config, slug: &str, page: Option<u32>) -> Result<()> {
    let site = site(config)?;
    let source = HttpSource::new().map_err(report)?;
    let url = match page_selector(page) {
        PageSelector::Default => site.files_url(slug).map_err(report)?,
        PageSelector::Page(page) => site.files_page_url(slug, page).map_err(report)?,
    };
    let listing = source.fetch(&url).await.map_err(report)?;
    let releases = Extractor::from_html(&listing).releases(slug, config.timestamps).map_err(report)?;
    println!("{slug}: {} releases listed", releases.len());
    for release in releases {
        let detail_url = site.release_url(slug, &release.remote_id).map_err(report)?;
        let detail = source.fetch(&detail_url).await.map_err(report)?;
        let hash = Extractor::from_html(&detail).content_hash().map_err(report)?;
        println!(
            "  {} [{}] {} {} md5={}",
            release.filename,
            release.maturity,
            release.version_label,
            uploaded(&release),
            hash
        );
    }
    Ok(())
}
