use crate::feedback::FeedbackLinks;
use crate::hw::FeedbackPanel;

#[embassy_executor::task]
pub async fn run(links: &'static FeedbackLinks, mut panel: FeedbackPanel<'static>) -> ! {
    loop {
        let feedback = links.next().await;
        panel.render(feedback).await;
    }
}
