use std::fmt::Write;

use super::client::{CategoryItem, RecipeItem, SessionUser};

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Recipebook</title>
</head>
<body>
<nav><a href="/">Home</a> <a href="/my-recipes">My recipes</a> <a href="/recipe/new">New recipe</a> <a href="/login">Log in</a>
<form method="post" action="/logout" style="display:inline"><button type="submit">Log out</button></form></nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        body = body
    )
}

fn minutes(label: &str, value: Option<i32>) -> String {
    value
        .map(|m| format!("<li>{}: {} min</li>", label, m))
        .unwrap_or_default()
}

fn recipe_card(recipe: &RecipeItem) -> String {
    format!(
        r#"<article class="recipe"><h3><a href="/recipe/{id}">{title}</a></h3><p>{category}</p><p>{likes} likes</p></article>"#,
        id = recipe.id,
        title = escape(&recipe.title),
        category = escape(recipe.category.as_deref().unwrap_or("")),
        likes = recipe.like_count,
    )
}

fn recipe_cards(recipes: &[RecipeItem]) -> String {
    if recipes.is_empty() {
        return "<p>No recipes yet.</p>".to_string();
    }
    recipes.iter().map(recipe_card).collect()
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("<li>{}</li>", escape(i)))
        .collect()
}

pub fn home(
    categories: &[CategoryItem],
    recipes: &[RecipeItem],
    error: Option<&str>,
) -> String {
    let mut body = String::new();
    if let Some(err) = error {
        let _ = write!(body, r#"<div class="error">{}</div>"#, escape(err));
    }
    body.push_str("<section><h2>Categories</h2><ul>");
    for c in categories {
        let _ = write!(body, "<li>{}</li>", escape(&c.name));
    }
    body.push_str("</ul></section>");

    let featured: Vec<RecipeItem> = recipes.iter().take(3).cloned().collect();
    let _ = write!(
        body,
        "<section><h2>Featured</h2>{}</section><section><h2>All recipes</h2>{}</section>",
        recipe_cards(&featured),
        recipe_cards(recipes)
    );
    layout("Home", &body)
}

pub fn recipe_detail(recipe: &RecipeItem) -> String {
    let image = recipe
        .image
        .as_deref()
        .filter(|src| src.starts_with("data:image/png;base64,"))
        .map(|src| format!(r#"<img src="{}" alt="{}">"#, escape(src), escape(&recipe.title)))
        .unwrap_or_default();
    let body = format!(
        r#"<article><h1>{title}</h1>{image}<p>{description}</p><ul>{prep}{cook}<li>{likes} likes</li></ul><h2>Ingredients</h2><ul>{ingredients}</ul><h2>Steps</h2><ol>{steps}</ol><a href="/recipe/edit/{id}">Edit</a></article>"#,
        title = escape(&recipe.title),
        image = image,
        description = escape(recipe.description.as_deref().unwrap_or("")),
        prep = minutes("Preparation", recipe.preparation_time),
        cook = minutes("Cooking", recipe.cooking_time),
        likes = recipe.like_count,
        ingredients = list_items(&recipe.ingredients),
        steps = list_items(&recipe.steps),
        id = recipe.id,
    );
    layout(&recipe.title, &body)
}

pub fn my_recipes(user: &SessionUser, recipes: &[RecipeItem]) -> String {
    let body = format!(
        "<h1>Recipes by {}</h1>{}",
        escape(&user.pseudo),
        recipe_cards(recipes)
    );
    layout("My recipes", &body)
}

/// Creation form when `existing` is `None`, edit form otherwise. The form is
/// submitted by a script that sends JSON to the API with the `auth_token` cookie.
pub fn recipe_form(existing: Option<&RecipeItem>) -> String {
    let (heading, method, action) = match existing {
        Some(r) => ("Edit recipe", "PATCH", format!("/api/recipe/{}", r.id)),
        None => ("New recipe", "POST", "/api/recipe".to_string()),
    };
    let field = |value: Option<&str>| escape(value.unwrap_or(""));
    let lines = |values: Option<&Vec<String>>| {
        escape(&values.map(|v| v.join("\n")).unwrap_or_default())
    };
    let number = |value: Option<i32>| value.map(|v| v.to_string()).unwrap_or_default();

    let body = format!(
        r#"<h1>{heading}</h1>
<form id="recipe-form" data-method="{method}" data-action="{action}">
<label>Title <input name="title" maxlength="100" required value="{title}"></label>
<label>Description <textarea name="description">{description}</textarea></label>
<label>Ingredients (one per line) <textarea name="ingredients">{ingredients}</textarea></label>
<label>Steps (one per line) <textarea name="steps">{steps}</textarea></label>
<label>Preparation time <input name="preparationTime" type="number" min="0" value="{prep}"></label>
<label>Cooking time <input name="cookingTime" type="number" min="0" value="{cook}"></label>
<label>Category <input name="category" maxlength="50" value="{category}"></label>
<label>Image (PNG) <input name="image" type="file" accept="image/png"></label>
<button type="submit">Save</button>
</form>
<script>
document.getElementById('recipe-form').addEventListener('submit', async (ev) => {{
  ev.preventDefault();
  const form = ev.target;
  const token = (document.cookie.split('; ').find(c => c.startsWith('auth_token=')) || '').slice(11);
  const lines = (name) => form[name].value.split('\n').map(s => s.trim()).filter(Boolean);
  const num = (name) => form[name].value === '' ? null : Number(form[name].value);
  const body = {{
    title: form.title.value,
    description: form.description.value,
    ingredients: lines('ingredients'),
    steps: lines('steps'),
    preparationTime: num('preparationTime'),
    cookingTime: num('cookingTime'),
    category: form.category.value || null,
  }};
  const file = form.image.files[0];
  if (file) {{
    body.image = await new Promise(resolve => {{
      const reader = new FileReader();
      reader.onload = () => resolve(reader.result);
      reader.readAsDataURL(file);
    }});
  }}
  const res = await fetch(form.dataset.action, {{
    method: form.dataset.method,
    headers: {{ 'Content-Type': 'application/json', 'Authorization': 'Bearer ' + token }},
    body: JSON.stringify(body),
  }});
  if (res.ok) window.location = '/my-recipes';
  else alert((await res.json()).message);
}});
</script>"#,
        heading = heading,
        method = method,
        action = action,
        title = field(existing.map(|r| r.title.as_str())),
        description = field(existing.and_then(|r| r.description.as_deref())),
        ingredients = lines(existing.map(|r| &r.ingredients)),
        steps = lines(existing.map(|r| &r.steps)),
        prep = number(existing.and_then(|r| r.preparation_time)),
        cook = number(existing.and_then(|r| r.cooking_time)),
        category = field(existing.and_then(|r| r.category.as_deref())),
    );
    layout(heading, &body)
}

/// Login form; `pseudo` is echoed back after a failed attempt.
pub fn login_form(pseudo: &str, error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
{banner}
<form method="post" action="/login">
<label>Pseudo <input name="pseudo" value="{pseudo}" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        banner = banner,
        pseudo = escape(pseudo),
    );
    layout("Log in", &body)
}

pub fn not_found() -> String {
    layout("Not found", "<h1>Page not found</h1>")
}
