use crate::editor::blocks::{action_button, field, fill_blank, image_field, read_src, read_text, shell, BlockKind};
use crate::editor::html::Element;

/// Header block with name, headline, contact lines and an avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub link: String,
    pub avatar: String,
}

impl Default for ContactFields {
    fn default() -> Self {
        Self {
            name: "홍길동".to_string(),
            headline: "백엔드 개발자".to_string(),
            email: "you@example.com".to_string(),
            phone: "010-0000-0000".to_string(),
            link: "github.com/username".to_string(),
            avatar: String::new(),
        }
    }
}

impl ContactFields {
    pub fn read(el: &Element) -> Self {
        let d = Self::default();
        Self {
            name: read_text(el, "name", &d.name),
            headline: read_text(el, "headline", &d.headline),
            email: read_text(el, "email", &d.email),
            phone: read_text(el, "phone", &d.phone),
            link: read_text(el, "link", &d.link),
            avatar: read_src(el, "avatar"),
        }
    }

    pub fn normalize(&mut self) {
        let d = Self::default();
        fill_blank(&mut self.name, &d.name);
        fill_blank(&mut self.headline, &d.headline);
        fill_blank(&mut self.email, &d.email);
        fill_blank(&mut self.phone, &d.phone);
        fill_blank(&mut self.link, &d.link);
    }

    pub(crate) fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "headline" => Some(&mut self.headline),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "link" => Some(&mut self.link),
            _ => None,
        }
    }

    pub fn render(&self) -> Element {
        let contact_line = |name: &str, value: &str| {
            Element::new("li").with_child(field("span", name, value))
        };
        shell(BlockKind::Contact, None)
            .with_child(
                Element::new("div")
                    .with_attr("class", "contact-avatar")
                    .with_child(image_field("avatar", &self.avatar, "avatar"))
                    .with_child(action_button("upload-avatar", "사진")),
            )
            .with_child(
                Element::new("div")
                    .with_attr("class", "contact-main")
                    .with_child(field("h1", "name", &self.name))
                    .with_child(field("p", "headline", &self.headline)),
            )
            .with_child(
                Element::new("ul")
                    .with_attr("class", "contact-list")
                    .with_child(contact_line("email", &self.email))
                    .with_child(contact_line("phone", &self.phone))
                    .with_child(contact_line("link", &self.link)),
            )
    }
}
