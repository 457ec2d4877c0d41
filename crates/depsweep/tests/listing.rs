use depsweep::app::prune::render_listing;
use depsweep::domain::model::Listing;
use insta::assert_snapshot;

#[test]
fn listing_renders_with_global_tags() {
    let listing = Listing::new(
        vec!["left-pad".into(), "moment".into(), "request".into()],
        vec!["nodemon".into(), "serve".into()],
    );
    let rendered = render_listing(&listing);
    assert_snapshot!("listing_mixed", rendered);
}
