//! Browser implementations of the router seams.

use std::cell::RefCell;

use leptos::mount::{UnmountHandle, mount_to};
use leptos::tachys::view::any_view::AnyViewState;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::app::AppContext;
use crate::pages::PageView;
use crate::router::{History, Outlet};
use crate::util::dom::CONTENT_ID;

/// `window.history` plus `popstate`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHistory;

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return "/".to_owned();
        };
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        format!("{path}{search}")
    }

    fn push(&self, path: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            let _ = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path));
        }
    }

    fn replace(&self, path: &str) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path));
        }
    }

    fn listen(&self, on_pop: Box<dyn Fn(String)>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let history = *self;
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| on_pop(history.current_path()));
        let _ = window.add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref());
        // Lives as long as the page.
        callback.forget();
    }
}

/// `#app-content`. Holds the mounted view; replacing it unmounts the old one
/// and disposes its reactive owner.
#[derive(Default)]
pub struct DomOutlet {
    mounted: RefCell<Option<UnmountHandle<AnyViewState>>>,
}

impl Outlet for DomOutlet {
    fn mount(&self, view: PageView) {
        drop(self.mounted.borrow_mut().take());
        let Some(container) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONTENT_ID))
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            log::warn!("content container #{CONTENT_ID} is missing");
            return;
        };
        let handle = mount_to(container, move || view.build());
        *self.mounted.borrow_mut() = Some(handle);
    }
}

/// Route plain left-clicks on `a[data-link]` through the router.
pub fn intercept_links(ctx: AppContext) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let callback = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if ev.default_prevented() || ev.button() != 0 || ev.ctrl_key() || ev.meta_key() || ev.shift_key() || ev.alt_key() {
            return;
        }
        let Some(target) = ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return;
        };
        let Ok(Some(link)) = target.closest("a[data-link]") else {
            return;
        };
        let Some(href) = link.get_attribute("href") else {
            return;
        };
        ev.prevent_default();
        ctx.navigator().go(&href);
    });
    let _ = document.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}
