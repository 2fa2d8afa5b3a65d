use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use naver_blog_md::{fetch, list, Post, RenderContext};

#[derive(Parser)]
#[command(name = "naver_blog_md", about = "Render Naver blog posts as Markdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ImageMode {
    /// Keep image URLs as they appear in the post
    Default,
    /// Rewrite image URLs to their canonical CDN form
    Cdn,
    /// Download images and embed local paths
    Fetch,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one post to Markdown
    Post {
        /// Blog identifier (the blogId query parameter)
        #[arg(short, long)]
        blog: String,
        /// Post identifier (the logNo query parameter)
        #[arg(short, long)]
        log_no: u64,
        #[arg(long, value_enum, default_value_t = ImageMode::Default)]
        images: ImageMode,
        /// Directory for downloaded images (fetch mode)
        #[arg(long)]
        assets_dir: Option<PathBuf>,
        /// Path prefix for embedded local image references (fetch mode)
        #[arg(long, default_value = "./")]
        image_prefix: String,
        /// Per-block render workers
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print one page of a blog's post list
    List {
        #[arg(short, long)]
        blog: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Category filter (0 = all categories)
        #[arg(short, long, default_value_t = 0)]
        category: i64,
        #[arg(long, default_value_t = 30)]
        page_size: u32,
    },
    /// Render every post of a blog into a directory
    Blog {
        #[arg(short, long)]
        blog: String,
        /// Output directory, one {logNo}.md per post
        #[arg(short, long)]
        out_dir: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        category: i64,
        #[arg(long, value_enum, default_value_t = ImageMode::Default)]
        images: ImageMode,
        #[arg(long)]
        assets_dir: Option<PathBuf>,
        #[arg(long, default_value = "./")]
        image_prefix: String,
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Post {
            blog,
            log_no,
            images,
            assets_dir,
            image_prefix,
            workers,
            output,
        } => {
            let context = render_context(images, assets_dir, image_prefix, workers)?;
            let post = Post::new(blog, log_no)?;
            let markdown = post.as_markdown(&context)?;
            match output {
                Some(path) => {
                    fs::write(&path, markdown)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{markdown}"),
            }
            Ok(())
        }
        Commands::List {
            blog,
            page,
            category,
            page_size,
        } => {
            let client = fetch::client()?;
            let listing = list::fetch_post_list(&client, &blog, page, category, page_size)?;
            if listing.post_list.is_empty() {
                println!("No posts on page {page}.");
                return Ok(());
            }

            println!(
                "{:>13} | {:<44} | {:>8} | {:<12}",
                "logNo", "Title", "Comments", "Added"
            );
            println!("{}", "-".repeat(86));
            for item in &listing.post_list {
                println!(
                    "{:>13} | {:<44} | {:>8} | {}",
                    item.log_no,
                    truncate(&item.title, 44),
                    item.comment_count,
                    item.add_date
                );
            }
            println!(
                "\npage {page} | {} shown | {} total",
                listing.post_list.len(),
                listing.total_count
            );
            Ok(())
        }
        Commands::Blog {
            blog,
            out_dir,
            category,
            images,
            assets_dir,
            image_prefix,
            workers,
        } => {
            let context = render_context(images, assets_dir, image_prefix, workers)?;
            let client = fetch::client()?;
            let posts = list::fetch_all_posts(&client, &blog, category)?;
            if posts.is_empty() {
                println!("No posts found.");
                return Ok(());
            }
            fs::create_dir_all(&out_dir)?;

            println!("Rendering {} posts...", posts.len());
            let pb = ProgressBar::new(posts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );

            let mut ok = 0usize;
            let mut errors = 0usize;
            for item in &posts {
                let post = Post::new(blog.clone(), item.log_no)?;
                match post.as_markdown(&context) {
                    Ok(markdown) => {
                        fs::write(out_dir.join(format!("{}.md", item.log_no)), markdown)?;
                        ok += 1;
                    }
                    Err(e) => {
                        warn!("failed to render {}: {}", item.log_no, e);
                        errors += 1;
                    }
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!("Done: {ok} rendered, {errors} errors.");
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn render_context(
    images: ImageMode,
    assets_dir: Option<PathBuf>,
    image_prefix: String,
    workers: usize,
) -> anyhow::Result<RenderContext> {
    Ok(match images {
        ImageMode::Default => RenderContext::with_default(workers),
        ImageMode::Cdn => RenderContext::with_images_from_cdn(workers),
        ImageMode::Fetch => {
            let dir = assets_dir.context("--assets-dir is required with --images fetch")?;
            fs::create_dir_all(&dir)?;
            RenderContext::with_fetched_local_images(dir, image_prefix, workers)
        }
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
