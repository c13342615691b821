use bookstand_application::{BrowserContext, filter_catalog};
use bookstand_catalog::Catalog;
use bookstand_core::{FilterCriteria, Settings};
use bookstand_ui::{Ui, detect_system_theme};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let catalog = Catalog::load()?;

    let settings = Settings {
        theme: detect_system_theme(),
    };

    // Initial paint shows the whole catalog, page 1.
    let mut ctx = BrowserContext::new(settings, catalog.page_size());
    let criteria = FilterCriteria::default();
    let matches = filter_catalog(catalog.books(), &criteria);
    ctx.reset_and_apply(criteria, matches);

    let mut ui = Ui::new(catalog, ctx);
    ui.run()
}
