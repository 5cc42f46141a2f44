//! Server-rendered HTML. Templates are compiled into the binary and
//! autoescaped; each page gets a serializable view model.

pub mod format;
pub mod invoice_form;
pub mod invoices;
pub mod pagination;

use serde::Serialize;
use tera::{Context, Tera};

use crate::validation::MIN_PASSWORD_LEN;

pub use invoice_form::{FormValues, InvoiceFormView};
pub use invoices::{EVENTS_PATH, InvoicesView};

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("templates/base.html")),
    ("nav.html", include_str!("templates/nav.html")),
    ("landing.html", include_str!("templates/landing.html")),
    ("login.html", include_str!("templates/login.html")),
    ("invoices.html", include_str!("templates/invoices.html")),
    ("invoice_form.html", include_str!("templates/invoice_form.html")),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginView {
    pub email: String,
    pub callback_url: String,
    pub error: Option<String>,
    pub min_password_len: usize,
}

impl LoginView {
    pub fn new(email: &str, callback_url: &str, error: Option<String>) -> Self {
        Self {
            email: email.to_string(),
            callback_url: callback_url.to_string(),
            error,
            min_password_len: MIN_PASSWORD_LEN,
        }
    }
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, template: &str, view: &T) -> Result<String, tera::Error> {
        let context = Context::from_serialize(view)?;
        self.tera.render(template, &context)
    }

    pub fn landing(&self) -> Result<String, tera::Error> {
        self.tera.render("landing.html", &Context::new())
    }

    pub fn login(&self, view: &LoginView) -> Result<String, tera::Error> {
        self.render("login.html", view)
    }

    pub fn invoices(&self, view: &InvoicesView) -> Result<String, tera::Error> {
        self.render("invoices.html", view)
    }

    pub fn invoice_form(&self, view: &InvoiceFormView) -> Result<String, tera::Error> {
        self.render("invoice_form.html", view)
    }
}

/// Fallback page for failed requests. Built without templates so it still
/// renders when template rendering is what failed.
pub fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Error | Acme Dashboard</title></head>\n<body>\n<main>\n  <h2>{}</h2>\n  <a href=\"/dashboard/invoices\">Try again</a>\n</main>\n</body>\n</html>\n",
        tera::escape_html(message)
    )
}

pub fn not_found_page() -> String {
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Not Found | Acme Dashboard</title></head>\n<body>\n<main>\n  <h2>404 Not Found</h2>\n  <p>Could not find the requested invoice.</p>\n  <a href=\"/dashboard/invoices\">Go Back</a>\n</main>\n</body>\n</html>\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceRow, InvoiceStatus};
    use crate::resolver::{InvoicesPage, PageResult, QueryState};
    use chrono::NaiveDate;

    fn renderer() -> Renderer {
        Renderer::new().expect("templates compile")
    }

    #[test]
    fn invoices_page_escapes_user_content() {
        let row = InvoiceRow {
            id: "inv-1".to_string(),
            customer_id: "c1".to_string(),
            name: "<script>alert(1)</script>".to_string(),
            email: "x@example.com".to_string(),
            image_url: "/customers/x.png".to_string(),
            amount: 100,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        };
        let page = InvoicesPage {
            state: QueryState {
                query: "\"><b>".to_string(),
                page: 1,
            },
            result: PageResult {
                total_pages: 1,
                rows: vec![row],
            },
        };

        let html = renderer()
            .invoices(&InvoicesView::new("/dashboard/invoices", "", &page))
            .unwrap();

        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(!html.contains("\"><b>"));
        assert!(html.contains("$1.00"));
        assert!(html.contains("Feb 29, 2024"));
        assert!(html.contains("new EventSource('/dashboard/invoices/events')"));
        assert!(html.contains("}, 300);"));
    }

    #[test]
    fn empty_page_says_so() {
        let page = InvoicesPage {
            state: QueryState {
                query: "nobody".to_string(),
                page: 1,
            },
            result: PageResult {
                total_pages: 0,
                rows: vec![],
            },
        };

        let html = renderer()
            .invoices(&InvoicesView::new("/dashboard/invoices", "query=nobody", &page))
            .unwrap();

        assert!(html.contains("No invoices found."));
        assert!(html.contains("data-key=\"nobody1\""));
    }

    #[test]
    fn login_page_shows_error() {
        let view = LoginView::new("a@b.co", "/dashboard", Some("Invalid credentials.".to_string()));
        let html = renderer().login(&view).unwrap();
        assert!(html.contains("Invalid credentials."));
        assert!(html.contains("minlength=\"6\""));
    }

    #[test]
    fn landing_and_fallback_pages_render() {
        assert!(renderer().landing().unwrap().contains("Log in"));
        assert!(error_page("Failed to <delete> invoice.").contains("Failed to &lt;delete&gt; invoice."));
        assert!(not_found_page().contains("404 Not Found"));
    }
}
