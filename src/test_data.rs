use crate::content::PostRecord;

pub const POST_SITES: &str = "---
title: Sites I keep coming back to
date: 2025-03-29
category: Project
excerpt: A short list of bookmarks
tags: [web, links]
---

## 자주 가는 사이트

Some **bookmarks** I use every week, with `curl` examples:

```bash
curl -I https://example.com
```

### Notes
";

pub const POST_NO_FRONT_MATTER: &str = "# Just a title

Plain body without any metadata.
";

pub const POST_MISSING_CATEGORY: &str = "---
title: Forgot the category
date: 2024-01-10
---
body
";

pub const POST_CUSTOM_ID: &str = "---
id: 42
title: Explicit id
date: 2024-06-01 09:30:00
category: CS
readTime: 10분
tags: [1, true, rust]
---
body
";

pub const POST_BAD_DATE: &str = "---
title: When?
date: sometime last spring
category: CS
---
body
";

pub fn record(id: &str, category: &str, date: &str) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("Title of {}", id),
        excerpt: String::new(),
        category: category.to_string(),
        date: date.to_string(),
        tags: vec![],
        read_time: String::new(),
        file: format!("/_posts/{}.md", id),
    }
}
