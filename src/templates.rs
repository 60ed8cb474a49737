use handlebars::Handlebars;
use std::sync::Arc;

use crate::error::Result;

pub type Hbs = Arc<Handlebars<'static>>;

const TEMPLATES: [(&str, &str); 6] = [
    ("alerts_list", include_str!("../templates/alerts_list.hbs")),
    ("stats", include_str!("../templates/stats.hbs")),
    ("notification", include_str!("../templates/notification.hbs")),
    ("inbox", include_str!("../templates/inbox.hbs")),
    ("profile", include_str!("../templates/profile.hbs")),
    ("analytics", include_str!("../templates/analytics.hbs")),
];

pub fn build_handlebars() -> Result<Hbs> {
    let mut hb = Handlebars::new();

    // terminal output, nothing to escape
    hb.register_escape_fn(handlebars::no_escape);

    for (name, source) in TEMPLATES {
        hb.register_template_string(name, source)?;
    }

    Ok(Arc::new(hb))
}
