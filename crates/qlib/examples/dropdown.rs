//! Dropdown example - wiring a bootstrap dropdown and clicking through it

use qlib::ext::{bootstrap, install, Animate, ANIMATE_CSS};
use qlib::{Document, Q};

const PAGE: &str = r#"<html><head></head><body>
  <div class="dropdown">
    <button class="dropdown-toggle" aria-expanded="false">Language</button>
    <ul class="dropdown-menu">
      <li class="active">Rust</li>
      <li>Go</li>
      <li>Zig</li>
    </ul>
  </div>
</body></html>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let document = Document::parse(PAGE);
    let q = Q::init(&document)?;
    println!("qlib {}", Q::version());

    install(&q, ANIMATE_CSS)?;
    bootstrap::dropdown(&q)?;

    // Open the menu
    q.select(".dropdown-toggle")?.trigger("click")?;
    println!("Open: {}", q.select(".dropdown")?.has_class("open")?);

    // Pick the last entry; the menu closes again
    let zig = q.select(".dropdown-menu li")?.eq(2, None)?;
    zig.trigger("click")?;
    zig.fade_in()?;
    println!("Picked: {}", q.select("li.active")?.text()?);
    println!("Open: {}", q.select(".dropdown")?.has_class("open")?);

    println!("{}", q.select(".dropdown")?.html()?);
    Ok(())
}
