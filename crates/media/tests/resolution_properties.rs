use media::{IdScheme, PrefixRule, Resolver, RuleSet};

const CORPUS: &[&str] = &[
    "page:services/hero.jpg",
    "page:/home/banner.webp",
    "component:navbar/logo.png",
    "component:footer//social/instagram.svg",
    "/images/team/dr-smith.jpg",
    "/images/gallery/before-after/lips 01.jpeg",
    "/videos/clinic-tour.mp4",
    "/favicon.ico",
    "/brochures/menu.pdf",
    "website/pages/services/hero",
    "website//components/navbar/logo.png",
    "https://res.cloudinary.com/demo/image/upload/v1699999999/website/pages/services/hero.jpg",
    "https://res.cloudinary.com/demo/image/upload/c_fill,w_300/f_auto/website/images/x.png",
    "https://res.cloudinary.com/demo/video/upload/website/videos/intro.webm",
    "https://cdn.example.com/some/other/thing.jpg",
    "hero-banner",
    "legacy:thing",
    "page:",
    "cms/uploads/photo.jpg",
];

fn resolver() -> Resolver {
    Resolver::new(RuleSet::default_for("website").expect("default rules"))
}

#[test]
fn resolution_is_idempotent() {
    let r = resolver();
    for raw in CORPUS {
        let once = r.public_id(raw).expect("resolve once");
        let twice = r.public_id(&once).expect("resolve twice");
        assert_eq!(once, twice, "not idempotent for {raw:?}");
    }
}

#[test]
fn resolution_is_deterministic() {
    let a = resolver();
    let b = resolver();
    for raw in CORPUS {
        assert_eq!(a.resolve(raw), b.resolve(raw));
    }
}

#[test]
fn every_known_prefix_lands_under_root() {
    let r = resolver();
    for raw in CORPUS {
        let res = r.resolve(raw).expect("resolve");
        match res.scheme {
            IdScheme::Page | IdScheme::Component | IdScheme::BarePath | IdScheme::Canonical => {
                assert!(res.public_id.starts_with("website/"), "{raw:?} -> {}", res.public_id)
            }
            IdScheme::Unknown => assert_eq!(res.public_id, *raw),
            _ => {}
        }
    }
}

#[test]
fn each_legacy_prefix_has_one_canonical_prefix() {
    let r = resolver();
    for rule in r.rules().rules() {
        let a = r.public_id(&format!("{}a/one.jpg", rule.legacy)).unwrap();
        let b = r.public_id(&format!("{}b/two.png", rule.legacy)).unwrap();
        assert!(a.starts_with(&rule.canonical));
        assert!(b.starts_with(&rule.canonical));
    }
}

#[test]
fn custom_rule_table_is_honoured() {
    let rules = vec![
        PrefixRule::new("asset:", "clinic/assets/", IdScheme::Page),
        PrefixRule::new("/", "clinic/public/", IdScheme::BarePath),
    ];
    let r = Resolver::new(RuleSet::new("clinic", rules).unwrap());
    assert_eq!(r.public_id("asset:spa/room.jpg").unwrap(), "clinic/assets/spa/room");
    assert_eq!(r.public_id("/room.jpg").unwrap(), "clinic/public/room");
    assert_eq!(r.public_id("page:x.jpg").unwrap(), "page:x.jpg");
}
