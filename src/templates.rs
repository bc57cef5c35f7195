//! Sample document bodies for testing and demonstration.
//!
//! Each body exercises a different mix of block kinds.

/// A generated guide in the shape the content model produces: a leading
/// heading that repeats the title, sections, lists and an emphasised note.
pub fn guide_template() -> &'static str {
    r##"
<h1>Temporary Car Insurance Guide</h1>
<p>Short-term cover lets you drive a car that is not yours for anything from
an hour to a few weeks, without touching the owner's annual policy.</p>

<h2>When it makes sense</h2>
<ul>
    <li>Borrowing a friend's car for a weekend trip</li>
    <li>Sharing the driving on a long journey</li>
    <li>Test-driving a car before you buy it</li>
    <li>Collecting a newly bought vehicle from the seller</li>
</ul>

<h2>What is covered</h2>
<p>Policies are <em>fully comprehensive</em> as standard: damage to the car
you are driving, third-party injury and property, fire and theft.</p>
<p><strong>Always check the excess before you buy.</strong></p>

<h3>Exclusions</h3>
<p>Racing, hire and reward, and driving outside the cover period are not
covered.<br>Neither is any driver not named on the certificate.</p>

<h2>Making a claim</h2>
<ol>
    <li>Stop safely and exchange details with everyone involved.</li>
    <li>Take photographs of the scene and the damage.</li>
    <li>Call the claims line printed on your certificate within 24 hours.</li>
</ol>
<h6>This guide is general information, not advice.</h6>
"##
}

/// Policy summary with every heading level and a few empty blocks.
pub fn policy_summary_template() -> &'static str {
    r##"
<h2>Policy Summary</h2>
<p>Policy number: <strong>TMP-2024-000183</strong></p>
<p></p>
<h3>Vehicle</h3>
<p>2019 Ford Fiesta &ndash; registration AB19 CDE</p>
<h4>Driver</h4>
<p>Alex Example<br>Date of birth: 02/02/1990</p>
<h5>Cover period</h5>
<p>From 09:00 on 1 June to 09:00 on 8 June</p>
<strong>Premium paid: &pound;84.50</strong>
<p>   </p>
"##
}

/// A body of `items` short list items, for multi-page layout.
pub fn long_list_template(items: usize) -> String {
    let mut html = String::from("<h2>Checklist</h2><ul>");
    for i in 1..=items {
        html.push_str(&format!("<li>Item {i}</li>"));
    }
    html.push_str("</ul>");
    html
}
