//! Blog listing with a tag filter, and single articles

use arcade_core::recommend::{find_article, related_articles, tag_cloud};
use arcade_core::{Article, RouteIntent};
use leptos::prelude::*;

use crate::app::{tr, SiteState};
use crate::components::render_load;

fn has_tag(article: &Article, tag: &str) -> bool {
    article.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

#[component]
fn ArticleCard(article: Article) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let href = RouteIntent::Article {
        slug: article.slug.clone(),
    }
    .href();
    let title = article.title;
    let excerpt = article.excerpt;
    let published = article.published_at.format("%Y-%m-%d").to_string();
    let reading_time = article.reading_time;

    view! {
        <a class="article-card" href=href>
            <img src=article.image_url alt="" loading="lazy"/>
            <div class="article-card-body">
                <h3>{move || title.get(state.language.get()).to_string()}</h3>
                <p>{move || excerpt.get(state.language.get()).to_string()}</p>
                <span class="article-meta">
                    {published}
                    " · "
                    {move || format!("{} {}", reading_time, tr(state.language.get(), "min read", "دقائق قراءة"))}
                </span>
            </div>
        </a>
    }
}

#[component]
pub fn BlogPage() -> impl IntoView {
    let state = expect_context::<SiteState>();
    let active_tag = RwSignal::new(None::<String>);
    let on_retry = Callback::new(move |_| state.reload_articles());

    let tags = move || {
        state.articles.with(|load| {
            load.ready()
                .map(|articles| tag_cloud(articles.iter().map(|a| a.tags.as_slice())))
                .unwrap_or_default()
        })
    };

    view! {
        <div class="page blog-page">
            <h1>{move || tr(state.language.get(), "Blog", "المدونة")}</h1>
            <div class="tag-cloud">
                <button class:active=move || active_tag.with(Option::is_none) on:click=move |_| active_tag.set(None)>
                    {move || tr(state.language.get(), "All", "الكل")}
                </button>
                <For
                    each=tags
                    key=|tag| tag.clone()
                    children=move |tag| {
                        let selected = tag.clone();
                        let pick = tag.clone();
                        view! {
                            <button
                                class:active=move || active_tag.with(|t| t.as_deref() == Some(selected.as_str()))
                                on:click=move |_| active_tag.set(Some(pick.clone()))
                            >
                                {tag}
                            </button>
                        }
                    }
                />
            </div>
            {move || {
                let filtered = state.articles.with(|load| {
                    load.map_ref(|articles| {
                        active_tag.with(|tag| {
                            articles
                                .iter()
                                .filter(|a| tag.as_deref().is_none_or(|t| has_tag(a, t)))
                                .cloned()
                                .collect::<Vec<_>>()
                        })
                    })
                });
                render_load(&filtered, on_retry, |articles| {
                    view! {
                        <div class="article-grid">
                            {articles.iter().cloned().map(|article| view! { <ArticleCard article=article/> }).collect_view()}
                        </div>
                    }
                })
            }}
        </div>
    }
}

#[component]
fn ArticleBody(article: Article, related: Vec<Article>) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let title = article.title;
    let content = article.content;
    let published = article.published_at.format("%Y-%m-%d").to_string();
    let reading_time = article.reading_time;

    view! {
        <article class="article">
            <h1>{move || title.get(state.language.get()).to_string()}</h1>
            <p class="article-meta">
                {article.author}
                " · "
                {published}
                " · "
                {move || format!("{} {}", reading_time, tr(state.language.get(), "min read", "دقائق قراءة"))}
            </p>
            <img class="article-image" src=article.image_url alt=""/>
            <div class="article-content">
                {move || {
                    content
                        .get(state.language.get())
                        .split('\n')
                        .filter(|p| !p.trim().is_empty())
                        .map(|p| view! { <p>{p.to_string()}</p> })
                        .collect_view()
                }}
            </div>
            <ul class="tag-list">
                {article.tags.into_iter().map(|tag| view! { <li>{tag}</li> }).collect_view()}
            </ul>
            {(!related.is_empty()).then(move || view! {
                <section class="related-articles">
                    <h2>{move || tr(state.language.get(), "Related Articles", "مقالات ذات صلة")}</h2>
                    <div class="article-grid">
                        {related.into_iter().map(|article| view! { <ArticleCard article=article/> }).collect_view()}
                    </div>
                </section>
            })}
        </article>
    }
}

#[component]
pub fn ArticlePage(slug: String) -> impl IntoView {
    let state = expect_context::<SiteState>();
    let on_retry = Callback::new(move |_| state.reload_articles());
    let found = Memo::new(move |_| {
        state.articles.with(|load| {
            load.try_map_ref(|articles| {
                let article = find_article(articles, &slug)?.clone();
                Ok((article, related_articles(articles, &slug)))
            })
        })
    });

    view! {
        <div class="page article-page">
            {move || {
                found.with(|load| {
                    render_load(load, on_retry, |(article, related)| {
                        view! { <ArticleBody article=article.clone() related=related.clone()/> }
                    })
                })
            }}
        </div>
    }
}
