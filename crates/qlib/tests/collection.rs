use qlib::{Document, Value, Q};

const PAGE: &str = "<html><head></head><body>\
    <div id='outer'>\
      <p class='lead'>one</p>\
      <p>two</p>\
      <section><p class='lead'>three</p></section>\
    </div>\
    <ul id='menu'><li>a</li><li>b</li><li>c</li></ul>\
    </body></html>";

fn setup() -> (Document, Q) {
    let document = Document::parse(PAGE);
    let q = Q::init(&document).unwrap();
    (document, q)
}

#[test]
fn test_selector_yields_document_order_without_duplicates() {
    let (document, q) = setup();
    let paragraphs = q.select("p, .lead").unwrap();

    let expected = document.query_selector_all("p").unwrap();
    assert_eq!(paragraphs.nodes(), expected.as_slice());
    assert_eq!(paragraphs.text().unwrap(), "one");
}

#[test]
fn test_filter_shrinks_the_set() {
    let (_document, q) = setup();
    let paragraphs = q.select("p").unwrap();
    let leads = paragraphs.filter(".lead").unwrap();

    assert_eq!(leads.len(), 2);
    assert!(leads.iter().all(|node| paragraphs.nodes().contains(node)));
    assert!(paragraphs.filter("li").unwrap().is_empty());
}

#[test]
fn test_parent_is_deduplicated() {
    let (_document, q) = setup();
    let items = q.select("#menu li").unwrap();
    let menu = q.select("#menu").unwrap();

    let parent = items.parent();
    assert_eq!(parent.len(), 1);
    assert_eq!(parent.get(0), menu.get(0));
}

#[test]
fn test_eq_bounds() {
    let (_document, q) = setup();
    let items = q.select("li").unwrap();

    let first = items.eq(0, Some(1)).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first.get(0), items.get(0));

    assert!(items.eq(items.len() as isize, Some(1)).unwrap().is_empty());
    assert_eq!(items.eq(1, Some(-1)).unwrap().len(), 2);
    assert!(items.eq(-1, None).is_err());
}

#[test]
fn test_data_round_trip_coerces() {
    let (_document, q) = setup();
    let outer = q.select("#outer").unwrap();

    outer.set_data("count", 42).unwrap().set_data("label", "hello").unwrap();
    assert_eq!(outer.attr("data-count").unwrap().as_deref(), Some("42"));
    assert_eq!(outer.data("count").unwrap(), Some(Value::Number(42.0)));
    assert_eq!(outer.data("label").unwrap(), Some(Value::from("hello")));
    assert!(outer.has_data("count label").unwrap());

    outer.remove_data("count").unwrap();
    assert_eq!(outer.data("count").unwrap(), None);
}

#[test]
fn test_add_class_is_set_union() {
    let (_document, q) = setup();
    let outer = q.select("#outer").unwrap();

    outer.set_attr("class", "a").unwrap();
    outer.add_class("a b").unwrap();
    assert_eq!(outer.attr("class").unwrap().as_deref(), Some("a b"));
    assert!(outer.has_class("b a").unwrap());
}

#[test]
fn test_fragment_insertion_round_trip() {
    let (_document, q) = setup();
    let menu = q.select("#menu").unwrap();

    let item = q.select("<li class='new'>d</li>").unwrap();
    assert_eq!(item.len(), 1);
    menu.append(&item).unwrap();

    let items = q.select("#menu li").unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items.eq(3, None).unwrap().text().unwrap(), "d");

    item.remove();
    assert_eq!(q.select("#menu li").unwrap().len(), 3);
}

#[test]
fn test_cookie_round_trip() {
    let (document, q) = setup();

    let cookies = q.cookies().unwrap();
    cookies.set("remember", true).unwrap().set("user", "ann lee").unwrap();
    assert!(document.cookie().contains("user=ann%20lee;"));

    let reloaded = q.cookies().unwrap();
    assert_eq!(reloaded.get("remember").unwrap(), Some(Value::Bool(true)));
    assert_eq!(reloaded.get("user").unwrap(), Some(Value::from("ann lee")));
    assert!(reloaded.has("remember user"));
}

#[test]
fn test_cookie_writers_on_one_page_both_apply() {
    let (document, q) = setup();
    let session = q.cookies().unwrap();
    let prefs = q.cookies().unwrap();

    session.set("a", 1).unwrap();
    prefs.set("b", 2).unwrap();
    assert_eq!(document.cookie(), "a=1;b=2;");
    assert!(q.cookies().unwrap().has("a b"));
}
