//! Sprig CLI entry point: serves the bundled demo page tree.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::sync::Arc;

use sprig::cli::{Cli, Commands};
use sprig::config::{Config, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    sprig::core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    sprig::logger::set_verbose(cli.verbose);

    let _config = init_config(Config::load(cli)?);

    match &cli.command {
        Commands::Serve { .. } => {
            let site = Arc::new(demo::site()?);
            sprig::cli::serve::bind_server(site)?.run()
        }
    }
}

/// The demo page tree: a root page with head metadata and styles, nested
/// literal routes, and a dynamic item section with a data loader.
mod demo {
    use anyhow::Result;
    use std::sync::LazyLock;

    use sprig::render::markup::{Markup, Node, el, fragment, page_slot, raw};
    use sprig::render::page::{Data, FnLoader, FnPage, FnShell, Page, Params};
    use sprig::render::styles::{StyleGroup, StyleSheet};
    use sprig::site::Site;

    /// Base styles shared by every page; per-page sheets layer on top.
    static BASE_STYLES: LazyLock<StyleSheet> =
        LazyLock::new(|| StyleSheet::new("body{font-family:sans-serif;margin:2rem}"));

    struct Home;

    impl Page for Home {
        fn page(&self, _: &Params, _: &Data) -> Result<Markup> {
            Ok(Markup::new(fragment([
                el("h1").text("Hello World!").into(),
                // Server-flattened shadow tree; converted by the bootstrap
                // and hydrated lazily once visible.
                raw(concat!(
                    "<demo-greeting>",
                    "<template shadowroot=\"open\"><p>Rendered on the server</p></template>",
                    "</demo-greeting>",
                )),
            ])))
        }

        fn head(&self, _: &Params, _: &Data) -> Option<Result<Markup>> {
            Some(Ok(Markup::new(fragment([
                el("meta")
                    .attr("name", "og:title")
                    .attr("content", "Sprig demo app")
                    .into(),
                el("meta")
                    .attr("name", "og:description")
                    .attr("content", "Home Page")
                    .into(),
            ]))))
        }

        fn styles(&self) -> Option<StyleGroup> {
            Some(StyleGroup::Group(vec![
                BASE_STYLES.clone().into(),
                StyleSheet::new("h1{color:blue}").into(),
            ]))
        }
    }

    struct ItemPage;

    impl Page for ItemPage {
        fn page(&self, params: &Params, data: &Data) -> Result<Markup> {
            Ok(Markup::new(fragment([
                el("h2").text(format!("Item {}", params["id"])).into(),
                el("p")
                    .text(format!("Name: {}", data["name"].as_str().unwrap_or("unknown")))
                    .into(),
                el("p")
                    .text(format!(
                        "Parts: {}",
                        data["parts"].as_array().map_or(0, Vec::len)
                    ))
                    .into(),
            ])))
        }

        fn styles(&self) -> Option<StyleGroup> {
            Some(StyleGroup::Sheet(BASE_STYLES.clone()))
        }
    }

    pub fn site() -> Result<Site> {
        let mut site = Site::new();

        site.set_shell(FnShell(|location: &str| {
            let link = |href: &'static str, label: &'static str| -> Node {
                el("li").child(el("a").attr("href", href).text(label)).into()
            };
            Ok(Markup::new(fragment([
                el("nav")
                    .attr("data-location", location)
                    .child(el("ul").children([
                        link("/", "Home"),
                        link("/about", "About"),
                        link("/items/1", "Main item"),
                        link("/items/1/part/10", "Main item Specific Part"),
                    ]))
                    .into(),
                page_slot(),
            ])))
        }));

        site.mount("/", Home)?;

        site.mount(
            "/about",
            FnPage(|_: &Params, _: &Data| Ok(Markup::from(el("h2").text("About")))),
        )?;
        site.mount(
            "/about/more",
            FnPage(|_: &Params, _: &Data| Ok(Markup::from(el("h2").text("More about us")))),
        )?;

        site.mount_with_loader(
            "/items/[id]",
            ItemPage,
            FnLoader(|params: &Params| {
                // Stand-in for a backend lookup keyed by the captured id.
                Ok(serde_json::json!({
                    "name": format!("item-{}", params["id"]),
                    "parts": ["head", "body", "tail"],
                }))
            }),
        )?;

        site.mount(
            "/items/[id]/part/[num]",
            FnPage(|params: &Params, _: &Data| {
                Ok(Markup::from(el("h3").text(format!(
                    "Part #{} for Item {}",
                    params["num"], params["id"]
                ))))
            }),
        )?;

        Ok(site)
    }
}
