use super::*;

#[test]
fn frame_wraps_children_under_the_heading() {
    let html = view! {
        <PageFrame class="users" title="Users">
            <p>"body"</p>
        </PageFrame>
    }
    .to_html();
    assert!(html.contains("page page--users"));
    assert!(html.contains("Users"));
    assert!(html.contains("<p>body</p>"));
}

#[test]
fn badge_class_follows_the_label() {
    let html = view! { <Badge label="Pending" /> }.to_html();
    assert!(html.contains("badge badge--pending"));
}

#[test]
fn text_is_escaped() {
    let html = view! { <EmptyState message="<b>none</b>" /> }.to_html();
    assert!(html.contains("&lt;b&gt;none&lt;/b&gt;"));
    assert!(!html.contains("<b>"));
}

#[test]
fn app_links_are_marked_for_the_router() {
    let html = view! { <AppLink href="/goal-setting">"Goals"</AppLink> }.to_html();
    assert!(html.contains(r#"href="/goal-setting""#));
    assert!(html.contains("data-link"));
}

#[test]
fn table_renders_headers() {
    let html = view! {
        <DataTable headers=&["Name", "Role"]>
            <tr><td>"Ann"</td></tr>
        </DataTable>
    }
    .to_html();
    assert!(html.contains("<th>Name</th>"));
    assert!(html.contains("<td>Ann</td>"));
}
